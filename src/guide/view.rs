//! Guide view state
//!
//! Everything a guide screen needs between events lives in one [`GuideView`]:
//! the channel snapshot, EPG entries, the program index, the selected window,
//! the current "now" and the scroll state. Each event (data refresh, scroll,
//! resize, tick, window change) updates it serially and rendering reads a
//! consistent snapshot through [`GuideView::visible_rows`].

use std::collections::HashMap;
use std::ops::Range;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::guide::index::{
    KeyStrategy, ProgramIndex, ResolvedKey, build_index, index_epg_entries, resolve_program_key,
};
use crate::guide::layout::{GuideGeometry, ProgramLayout};
use crate::guide::time_slots::{compute_window, enumerate_slots, window_for_now};
use crate::guide::virtualizer::{RowVirtualizer, VisibleRows};
use crate::models::channel::sort_for_guide;
use crate::models::{Channel, ChannelFilter, EpgDataEntry, EpgDataId, Program, TimeWindow};

/// One program laid out inside a row
#[derive(Debug, Clone, Serialize)]
pub struct ProgramCell<'a> {
    pub program: &'a Program,
    pub layout: ProgramLayout,
    pub airing: bool,
}

/// One channel row; `cells` empty means "no program data"
#[derive(Debug, Clone, Serialize)]
pub struct GuideRow<'a> {
    /// Position among the filtered rows
    pub row_index: usize,
    pub channel: &'a Channel,
    pub matched_by: Option<KeyStrategy>,
    pub cells: Vec<ProgramCell<'a>>,
}

impl GuideRow<'_> {
    pub fn has_programs(&self) -> bool {
        !self.cells.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GuideView {
    timezone: Tz,
    geometry: GuideGeometry,
    channels: Vec<Channel>,
    filter: ChannelFilter,
    /// Indices into `channels` that pass `filter`, in row order
    rows: Vec<usize>,
    epg_entries: HashMap<EpgDataId, EpgDataEntry>,
    index: ProgramIndex,
    /// Channel id -> matched key; depends on channels, entries and index
    channel_keys: HashMap<i64, ResolvedKey>,
    window: TimeWindow,
    now: DateTime<Utc>,
    virtualizer: RowVirtualizer,
}

impl GuideView {
    /// Empty view showing "today at the current hour"
    pub fn new(timezone: Tz, geometry: GuideGeometry, overscan: usize, now: DateTime<Utc>) -> Self {
        Self {
            timezone,
            geometry,
            channels: Vec::new(),
            filter: ChannelFilter::default(),
            rows: Vec::new(),
            epg_entries: HashMap::new(),
            index: ProgramIndex::default(),
            channel_keys: HashMap::new(),
            window: window_for_now(now, &timezone),
            now,
            virtualizer: RowVirtualizer::new(geometry.row_height_px, overscan),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn geometry(&self) -> &GuideGeometry {
        &self.geometry
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn index(&self) -> &ProgramIndex {
        &self.index
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Rows left after filtering
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn visible(&self) -> VisibleRows {
        self.virtualizer.visible()
    }

    pub fn set_channels(&mut self, mut channels: Vec<Channel>) {
        sort_for_guide(&mut channels);
        self.channels = channels;
        self.refilter();
        self.rebuild_channel_keys();
    }

    pub fn set_epg_entries(&mut self, entries: Vec<EpgDataEntry>) {
        self.epg_entries = index_epg_entries(entries);
        self.rebuild_channel_keys();
    }

    pub fn set_programs(&mut self, programs: Vec<Program>) {
        self.index = build_index(programs);
        self.rebuild_channel_keys();
    }

    pub fn set_filter(&mut self, filter: ChannelFilter) {
        self.filter = filter;
        self.refilter();
    }

    /// Show `date` from `start_hour` local time
    pub fn select(&mut self, date: NaiveDate, start_hour: u32) {
        self.set_window(compute_window(date, start_hour, &self.timezone));
    }

    /// Move the window by whole hours (negative moves back)
    pub fn shift_window(&mut self, hours: i64) {
        self.set_window(self.window.shifted(hours));
    }

    /// Window containing the current "now"
    pub fn jump_to_now(&mut self) {
        self.set_window(window_for_now(self.now, &self.timezone));
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        if window != self.window {
            debug!("Guide window {} .. {}", window.start, window.end);
        }
        self.window = window;
    }

    /// Refresh the instant used for airing checks and the now marker
    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn on_scroll(&mut self, scroll_top_px: f64) -> bool {
        self.virtualizer.on_scroll(scroll_top_px)
    }

    pub fn on_resize(&mut self, viewport_height_px: f64) -> bool {
        self.virtualizer.on_resize(viewport_height_px)
    }

    /// Column header boundaries for the current window
    pub fn slots(&self) -> Vec<DateTime<Utc>> {
        enumerate_slots(&self.window)
    }

    pub fn now_marker_offset(&self) -> Option<f64> {
        self.geometry.now_marker_offset(self.now, &self.window)
    }

    /// Rows inside the virtualized range, laid out against the current window
    pub fn visible_rows(&self) -> Vec<GuideRow<'_>> {
        self.rows_for(self.virtualizer.visible().range(), &self.window)
    }

    /// Rows `range` (clamped to the filtered row count) laid out against `window`
    pub fn rows_for(&self, range: Range<usize>, window: &TimeWindow) -> Vec<GuideRow<'_>> {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);

        (start..end)
            .map(|row_index| {
                let channel = &self.channels[self.rows[row_index]];
                self.build_row(row_index, channel, window)
            })
            .collect()
    }

    fn build_row<'a>(
        &'a self,
        row_index: usize,
        channel: &'a Channel,
        window: &TimeWindow,
    ) -> GuideRow<'a> {
        let resolved = self.channel_keys.get(&channel.id);
        let cells: Vec<ProgramCell<'a>> = resolved
            .map(|resolved| {
                self.index
                    .get(&resolved.key)
                    .iter()
                    .filter(|program| program.overlaps(window))
                    .map(|program| ProgramCell {
                        program,
                        layout: self.geometry.layout_program(program, window),
                        airing: program.is_airing_at(self.now),
                    })
                    .collect()
            })
            .unwrap_or_default();

        GuideRow {
            row_index,
            channel,
            matched_by: resolved.map(|r| r.strategy),
            cells,
        }
    }

    fn refilter(&mut self) {
        self.rows = self
            .channels
            .iter()
            .enumerate()
            .filter(|(_, channel)| self.filter.matches(channel))
            .map(|(i, _)| i)
            .collect();
        self.virtualizer.set_total_rows(self.rows.len());
    }

    fn rebuild_channel_keys(&mut self) {
        self.channel_keys = self
            .channels
            .iter()
            .filter_map(|channel| {
                resolve_program_key(channel, &self.epg_entries, &self.index)
                    .map(|resolved| (channel.id, resolved))
            })
            .collect();

        debug!(
            "Guide data: {} channels, {} with program data, {} programs",
            self.channels.len(),
            self.channel_keys.len(),
            self.index.program_count()
        );
    }
}
