//! Pixel geometry for program cells

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guide::{
    MIN_PROGRAM_WIDTH_PX, PROGRAM_GAP_PX, ROW_HEIGHT_PX, SLOT_MINUTES, SLOT_WIDTH_PX,
};
use crate::models::{Program, TimeWindow};

/// Horizontal position of a program cell relative to the window start
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgramLayout {
    pub offset_px: f64,
    pub width_px: f64,
}

/// Grid dimensions used to turn minutes into pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideGeometry {
    pub slot_width_px: f64,
    pub slot_minutes: i64,
    /// Rendered width floor so short programs stay clickable
    pub min_program_width_px: f64,
    /// Gutter subtracted from each cell's width
    pub program_gap_px: f64,
    pub row_height_px: f64,
}

impl Default for GuideGeometry {
    fn default() -> Self {
        Self {
            slot_width_px: SLOT_WIDTH_PX,
            slot_minutes: SLOT_MINUTES,
            min_program_width_px: MIN_PROGRAM_WIDTH_PX,
            program_gap_px: PROGRAM_GAP_PX,
            row_height_px: ROW_HEIGHT_PX,
        }
    }
}

impl GuideGeometry {
    pub fn pixels_per_minute(&self) -> f64 {
        self.minutes_to_px(1.0)
    }

    /// Multiply before dividing so whole slots map to exact pixel values
    fn minutes_to_px(&self, minutes: f64) -> f64 {
        if self.slot_minutes <= 0 {
            return 0.0;
        }
        minutes * self.slot_width_px / self.slot_minutes as f64
    }

    /// Full pixel width of `window`
    pub fn window_width_px(&self, window: &TimeWindow) -> f64 {
        self.minutes_to_px(minutes_between(window.start, window.end))
    }

    /// Clamp `program` to `window` and convert to pixels
    ///
    /// Callers filter with the overlap test first; a program outside the window
    /// would come out with a clamped duration of zero and the minimum width.
    pub fn layout_program(&self, program: &Program, window: &TimeWindow) -> ProgramLayout {
        let visible_start = program.start_time.max(window.start);
        let visible_end = program.end_time.min(window.end).max(visible_start);

        let offset_px = self.minutes_to_px(minutes_between(window.start, visible_start));
        let duration_px = self.minutes_to_px(minutes_between(visible_start, visible_end));

        ProgramLayout {
            offset_px,
            width_px: (duration_px - self.program_gap_px).max(self.min_program_width_px),
        }
    }

    /// Horizontal position of the "now" marker, when `now` is inside `window`
    pub fn now_marker_offset(&self, now: DateTime<Utc>, window: &TimeWindow) -> Option<f64> {
        window
            .contains(now)
            .then(|| self.minutes_to_px(minutes_between(window.start, now)))
    }
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// [`GuideGeometry::layout_program`] with the default grid dimensions
pub fn layout_program(program: &Program, window: &TimeWindow) -> ProgramLayout {
    GuideGeometry::default().layout_program(program, window)
}

/// True iff `start <= now < end`
pub fn is_currently_airing(program: &Program, now: DateTime<Utc>) -> bool {
    program.is_airing_at(now)
}
