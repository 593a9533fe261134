use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod channel;
pub mod program;

pub use channel::ChannelFilter;

/// Backend identifier of an EPG data entry
pub type EpgDataId = i64;

// Channel Models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub id: i64,
    /// Display number; channels without one sort last
    #[serde(default)]
    pub channel_number: Option<f64>,
    pub name: String,
    #[serde(default)]
    pub tvg_id: Option<String>,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub epg_data_id: Option<EpgDataId>,
    #[serde(default)]
    pub channel_group: Option<String>,
    #[serde(default)]
    pub logo_id: Option<i64>,
}

/// Indirection from a channel's `epg_data_id` to the tvg_id used by guide data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpgDataEntry {
    pub id: EpgDataId,
    #[serde(default)]
    pub tvg_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub epg_source: Option<i64>,
}

/// A normalized guide program
///
/// Only produced by `crate::ingestor`, which guarantees `start_time < end_time`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Join key to channels. Dummy sources store a channel UUID here.
    pub tvg_id: String,
}

/// Half-open time range `[start, end)` shown by the guide
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `instant` lies inside `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Strict overlap test against another half-open range
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    /// Same-length window moved by `hours` (negative moves back)
    pub fn shifted(&self, hours: i64) -> Self {
        let delta = Duration::hours(hours);
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

/// Date range requested from a data source when loading programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<TimeWindow> for ProgramRange {
    fn from(window: TimeWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_window_half_open() {
        let w = window();
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
        assert_eq!(w.duration(), Duration::hours(6));
    }

    #[test]
    fn test_overlap_is_strict() {
        let w = window();
        // Ends exactly at window start: not in view
        assert!(!w.overlaps(w.start - Duration::hours(1), w.start));
        // Starts exactly at window end: not in view
        assert!(!w.overlaps(w.end, w.end + Duration::hours(1)));
        // Spans the whole window
        assert!(w.overlaps(w.start - Duration::hours(1), w.end + Duration::hours(1)));
    }

    #[test]
    fn test_shifted() {
        let w = window().shifted(-6);
        assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap());
        assert_eq!(w.duration(), Duration::hours(6));
    }
}
