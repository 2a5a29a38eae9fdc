//! Adapter implementations for engagement ports.

pub mod memory;
pub mod postgres;
