//! Utility functions for common type conversions.

pub mod conversion;

pub use conversion::*;
