//! Error type definitions for the EPG guide
//!
//! The guide core itself is total and never returns these. They belong to
//! the boundaries around it: ingestion, data sources and configuration.

use thiserror::Error;

use crate::utils::datetime::DateTimeError;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Guide data source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Data source specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Invalid source configuration
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    /// HTTP errors returned by the backend
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Response body could not be decoded
    #[error("Parse error: {endpoint} - {message}")]
    ParseError { endpoint: String, message: String },
}

/// Rejections raised while normalizing raw programs at the ingestion boundary
#[derive(Error, Debug, PartialEq)]
pub enum IngestError {
    /// Neither the current nor the legacy field carried a timestamp
    #[error("Program {program_id}: missing {field} timestamp")]
    MissingTimestamp {
        program_id: String,
        field: &'static str,
    },

    /// A timestamp was present but not parseable
    #[error("Program {program_id}: invalid {field} timestamp: {source}")]
    InvalidTimestamp {
        program_id: String,
        field: &'static str,
        #[source]
        source: DateTimeError,
    },

    /// End does not come after start
    #[error("Program {program_id}: end {end} is not after start {start}")]
    EmptyInterval {
        program_id: String,
        start: String,
        end: String,
    },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create an invalid configuration error
    pub fn invalid_config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl IngestError {
    /// Identifier of the rejected program
    pub fn program_id(&self) -> &str {
        match self {
            Self::MissingTimestamp { program_id, .. }
            | Self::InvalidTimestamp { program_id, .. }
            | Self::EmptyInterval { program_id, .. } => program_id,
        }
    }
}
