use chrono::{DateTime, Utc};

use crate::models::{Program, TimeWindow};

impl Program {
    /// In view iff `start < window.end && end > window.start`
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        window.overlaps(self.start_time, self.end_time)
    }

    /// Half-open airing check, start-inclusive
    pub fn is_airing_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Title with the episode sub-title appended when present
    pub fn display_title(&self) -> String {
        match self.sub_title.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(sub_title) => format!("{}: {}", self.title, sub_title),
            None => self.title.clone(),
        }
    }
}
