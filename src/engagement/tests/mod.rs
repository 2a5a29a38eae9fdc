//! Unit tests for the engagement module.
