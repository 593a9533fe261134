//! Utility modules for the epg-guide crate
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod datetime;
pub mod url;

pub use datetime::{DateTimeError, DateTimeParser};
