//! # bo-core
//!
//! Core types for beneficiary-ownership case search.
//!
//! This crate provides the classification enums, request/response types and
//! the error type that the database layer depends on.

pub mod defaults;
pub mod error;
pub mod models;
pub mod search;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use search::*;
