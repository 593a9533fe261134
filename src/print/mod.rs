//! Print pagination
//!
//! A print run covers a longer range than the on-screen window. The range is
//! split into time chunks of `hours_per_page` and the filtered channel rows into
//! chunks of `rows_per_page`. Pages are ordered channel-chunk-major: every time
//! chunk for the first block of channels, then the next block.

use std::ops::Range;

use chrono::{Duration, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::config::PrintConfig;
use crate::guide::compute_window;
use crate::models::TimeWindow;

pub mod text;

pub use text::{render_grid, render_page};

/// One printed page: a block of rows over one time chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintPage {
    /// 1-based
    pub number: usize,
    pub window: TimeWindow,
    pub rows: Range<usize>,
}

/// `hours` starting at `date` `start_hour`:00 local time
pub fn print_range<T: TimeZone>(date: NaiveDate, start_hour: u32, hours: i64, tz: &T) -> TimeWindow {
    let start = compute_window(date, start_hour, tz).start;
    TimeWindow::new(start, start + Duration::hours(hours.max(0)))
}

/// Consecutive windows of `hours_per_page`; the last one is cut at `range.end`
pub fn time_chunks(range: &TimeWindow, hours_per_page: i64) -> Vec<TimeWindow> {
    if range.end <= range.start {
        return Vec::new();
    }
    if hours_per_page <= 0 {
        return vec![*range];
    }

    let step = Duration::hours(hours_per_page);
    let mut chunks = Vec::new();
    let mut start = range.start;
    while start < range.end {
        let end = (start + step).min(range.end);
        chunks.push(TimeWindow::new(start, end));
        start = end;
    }
    chunks
}

/// Row ranges of at most `rows_per_page`; no rows still yields one empty block
pub fn channel_chunks(total_rows: usize, rows_per_page: usize) -> Vec<Range<usize>> {
    if total_rows == 0 {
        return vec![0..0];
    }
    if rows_per_page == 0 {
        return vec![0..total_rows];
    }

    (0..total_rows)
        .step_by(rows_per_page)
        .map(|start| start..(start + rows_per_page).min(total_rows))
        .collect()
}

pub fn paginate(range: &TimeWindow, total_rows: usize, config: &PrintConfig) -> Vec<PrintPage> {
    let times = time_chunks(range, config.hours_per_page);
    let blocks = channel_chunks(total_rows, config.rows_per_page);

    let pages: Vec<PrintPage> = blocks
        .iter()
        .flat_map(|rows| times.iter().map(move |window| (rows.clone(), *window)))
        .enumerate()
        .map(|(i, (rows, window))| PrintPage {
            number: i + 1,
            window,
            rows,
        })
        .collect();

    debug!(
        "Paginated {} rows over {} time chunks into {} pages",
        total_rows,
        times.len(),
        pages.len()
    );
    pages
}
