//! Step definitions for engagement behaviour tests.

pub mod given;
pub mod then;
pub mod when;
