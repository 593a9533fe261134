//! Row virtualization for the channel list
//!
//! Only the rows intersecting the viewport, plus `overscan` rows on either
//! side, are rendered. The rendered slice is translated by `offset_y_px` and the
//! scroll container is sized by `total_height_px` so the scrollbar stays true.

use std::ops::Range;

use serde::Serialize;
use tracing::trace;

/// Slice of rows to render for one scroll position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibleRows {
    pub start_index: usize,
    /// Exclusive
    pub end_index: usize,
    pub offset_y_px: f64,
    pub total_height_px: f64,
}

impl VisibleRows {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
        offset_y_px: 0.0,
        total_height_px: 0.0,
    };

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Visible row range for a fixed row height
///
/// - `start_index = max(0, floor(scroll_top / row_height) - overscan)`
/// - `end_index = min(total_rows, start_index + ceil(viewport / row_height) + 2 * overscan)`
///
/// No rows, a zero-height viewport or a non-positive row height give
/// [`VisibleRows::EMPTY`]. Negative scroll offsets (overscroll bounce) count as 0.
pub fn compute_visible_rows(
    total_rows: usize,
    scroll_top_px: f64,
    viewport_height_px: f64,
    row_height_px: f64,
    overscan: usize,
) -> VisibleRows {
    if total_rows == 0 || viewport_height_px <= 0.0 || row_height_px <= 0.0 {
        return VisibleRows::EMPTY;
    }

    let scroll_top = scroll_top_px.max(0.0);
    let first_visible = (scroll_top / row_height_px).floor() as usize;
    let start_index = first_visible.saturating_sub(overscan).min(total_rows);

    let viewport_rows = (viewport_height_px / row_height_px).ceil() as usize;
    let visible_count = viewport_rows.saturating_add(overscan.saturating_mul(2));
    let end_index = start_index.saturating_add(visible_count).min(total_rows);

    VisibleRows {
        start_index,
        end_index,
        offset_y_px: start_index as f64 * row_height_px,
        total_height_px: total_rows as f64 * row_height_px,
    }
}

/// Scroll-container state feeding [`compute_visible_rows`]
///
/// Recomputes on every scroll or resize; the computation is O(1). The return
/// value of [`RowVirtualizer::on_scroll`] / [`RowVirtualizer::on_resize`] tells the
/// caller whether the rendered slice changed.
#[derive(Debug, Clone)]
pub struct RowVirtualizer {
    row_height_px: f64,
    overscan: usize,
    total_rows: usize,
    scroll_top_px: f64,
    viewport_height_px: f64,
    current: VisibleRows,
}

impl RowVirtualizer {
    pub fn new(row_height_px: f64, overscan: usize) -> Self {
        Self {
            row_height_px,
            overscan,
            total_rows: 0,
            scroll_top_px: 0.0,
            viewport_height_px: 0.0,
            current: VisibleRows::EMPTY,
        }
    }

    pub fn visible(&self) -> VisibleRows {
        self.current
    }

    pub fn scroll_top_px(&self) -> f64 {
        self.scroll_top_px
    }

    pub fn viewport_height_px(&self) -> f64 {
        self.viewport_height_px
    }

    pub fn row_height_px(&self) -> f64 {
        self.row_height_px
    }

    pub fn on_scroll(&mut self, scroll_top_px: f64) -> bool {
        self.scroll_top_px = scroll_top_px;
        self.recompute()
    }

    pub fn on_resize(&mut self, viewport_height_px: f64) -> bool {
        self.viewport_height_px = viewport_height_px;
        self.recompute()
    }

    /// Row count changed (data refresh or filter)
    pub fn set_total_rows(&mut self, total_rows: usize) -> bool {
        self.total_rows = total_rows;
        self.recompute()
    }

    fn recompute(&mut self) -> bool {
        let next = compute_visible_rows(
            self.total_rows,
            self.scroll_top_px,
            self.viewport_height_px,
            self.row_height_px,
            self.overscan,
        );
        let changed = next != self.current;
        if changed {
            trace!(
                "Visible rows {}..{} of {}",
                next.start_index, next.end_index, self.total_rows
            );
        }
        self.current = next;
        changed
    }
}
