//! Public types and errors.

pub mod error;
pub mod types;
