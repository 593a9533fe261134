//! Time window and slot boundaries for the guide header

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::guide::{HOURS_TO_SHOW, SLOT_MINUTES};
use crate::models::TimeWindow;

/// Window starting at `date` `start_hour:00:00.000` local time in `tz`, `HOURS_TO_SHOW` long
///
/// Hours above 23 are clamped. A start inside a DST gap moves forward to the
/// first local instant that exists; an ambiguous start takes the earlier one.
pub fn compute_window<T: TimeZone>(date: NaiveDate, start_hour: u32, tz: &T) -> TimeWindow {
    let hour = start_hour.min(23);
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default());

    let start = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => first_instant_after_gap(naive, tz),
    };

    TimeWindow::new(start, start + Duration::hours(HOURS_TO_SHOW))
}

/// DST gaps are at most a few hours; step forward a minute at a time
fn first_instant_after_gap<T: TimeZone>(naive: chrono::NaiveDateTime, tz: &T) -> DateTime<Utc> {
    (1..=24 * 60)
        .map(|minutes| naive + Duration::minutes(minutes))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Window for "today at the current hour" as seen in `tz`
pub fn window_for_now<T: TimeZone>(now: DateTime<Utc>, tz: &T) -> TimeWindow {
    let local = now.with_timezone(tz);
    compute_window(local.date_naive(), local.hour(), tz)
}

/// Slot boundaries every `SLOT_MINUTES` from `window.start` up to, excluding, `window.end`
pub fn enumerate_slots(window: &TimeWindow) -> Vec<DateTime<Utc>> {
    let step = Duration::minutes(SLOT_MINUTES);
    let mut slots = Vec::new();
    let mut slot = window.start;
    while slot < window.end {
        slots.push(slot);
        slot += step;
    }
    slots
}

/// Number of slots a full window holds
pub const fn slots_per_window() -> usize {
    (HOURS_TO_SHOW * 60 / SLOT_MINUTES) as usize
}
