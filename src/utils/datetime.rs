//! Centralized datetime handling utilities
//!
//! Program timestamps reach the guide from several backends: JSON APIs emit
//! RFC3339, XMLTV-derived data uses `20230101120000 +0100`, and older exports
//! carry naive `2023-01-01 12:00:00` values or bare Unix epochs. Everything is
//! normalized to `DateTime<Utc>` here, before programs enter the guide index.
//!
//! # Usage
//!
//! ```rust
//! use epg_guide::utils::datetime::DateTimeParser;
//!
//! let dt1 = DateTimeParser::parse_flexible("2023-01-01T12:00:00Z").unwrap();
//! let dt2 = DateTimeParser::parse_flexible("20230101120000 +0000").unwrap();
//! assert_eq!(dt1, dt2);
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors that can occur during datetime operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected RFC3339 (2023-01-01T12:00:00Z), XMLTV (20230101120000 +0000) or a Unix timestamp")]
    InvalidFormat { input: String },

    /// Timezone name could not be resolved
    #[error("Failed to parse timezone from: {input}")]
    TimezoneParseError { input: String },
}

/// Centralized datetime parsing and formatting utilities
pub struct DateTimeParser;

impl DateTimeParser {
    /// Parse datetime from the formats seen in guide data
    ///
    /// Supports:
    /// - RFC3339 with timezone or offset: "2023-01-01T12:00:00Z"
    /// - XMLTV with offset: "20230101120000 +0100"
    /// - Naive formats (assumed UTC): "2023-01-01 12:00:00", "20230101120000"
    /// - Unix epoch seconds: "1672574400"
    pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
        let trimmed = datetime_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        let offset_formats = [
            "%Y%m%d%H%M%S %z", // XMLTV
            "%Y-%m-%dT%H:%M:%S%z",
            "%Y-%m-%d %H:%M:%S%z",
        ];
        for format in &offset_formats {
            if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
                return Ok(dt.with_timezone(&Utc));
            }
        }

        // Bare epochs are all digits and shorter than the 14-digit XMLTV form
        if !trimmed.is_empty()
            && trimmed.len() < 14
            && trimmed.bytes().all(|b| b.is_ascii_digit())
            && let Ok(epoch) = trimmed.parse::<i64>()
            && let Some(dt) = DateTime::from_timestamp(epoch, 0)
        {
            return Ok(dt);
        }

        let naive_formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y%m%d%H%M%S",
        ];
        for format in &naive_formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        Err(DateTimeError::InvalidFormat {
            input: datetime_str.to_string(),
        })
    }

    /// Resolve a timezone name ("Europe/London", "UTC")
    pub fn parse_timezone(tz_str: &str) -> Result<Tz, DateTimeError> {
        tz_str
            .trim()
            .parse::<Tz>()
            .map_err(|_| DateTimeError::TimezoneParseError {
                input: tz_str.to_string(),
            })
    }

    /// Format an instant as local wall-clock `HH:MM` in `tz`
    pub fn format_clock<T: TimeZone>(dt: &DateTime<Utc>, tz: &T) -> String
    where
        T::Offset: std::fmt::Display,
    {
        dt.with_timezone(tz).format("%H:%M").to_string()
    }

    /// Format datetime for API requests (RFC3339)
    pub fn format_for_api(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }
}
