//! Centralized error handling for the EPG guide
//!
//! # Error Categories
//!
//! - **Source Errors**: backend connectivity and response decoding
//! - **Ingest Errors**: programs rejected at the ingestion boundary
//! - **Configuration Errors**: bad settings
//!
//! The time-grid core (`crate::guide`) has no error paths: lookup misses
//! produce empty results, not errors.
//!
//! # Usage
//!
//! ```rust
//! use epg_guide::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
