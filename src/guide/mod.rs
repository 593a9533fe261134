//! EPG program guide time-grid engine
//!
//! Pure, synchronous building blocks for rendering a channel-by-time guide:
//!
//! - [`time_slots`]: the visible [`TimeWindow`](crate::models::TimeWindow) and its slot boundaries
//! - [`index`]: programs grouped by identity key and matched to channels
//! - [`layout`]: program cells in pixels, "currently airing" checks
//! - [`virtualizer`]: which channel rows to render for a scroll position
//! - [`view`]: component-local state combining the above for a renderer

pub mod index;
pub mod layout;
pub mod time_slots;
pub mod view;
pub mod virtualizer;

pub use index::{
    KeyStrategy, ProgramIndex, RESOLUTION_TIERS, ResolvedKey, build_index, index_epg_entries,
    resolve_channel_programs, resolve_program_key,
};
pub use layout::{GuideGeometry, ProgramLayout, is_currently_airing, layout_program};
pub use time_slots::{compute_window, enumerate_slots, window_for_now};
pub use view::{GuideRow, GuideView, ProgramCell};
pub use virtualizer::{RowVirtualizer, VisibleRows, compute_visible_rows};

/// Length of the visible window
pub const HOURS_TO_SHOW: i64 = 6;
/// Width of one header slot in minutes
pub const SLOT_MINUTES: i64 = 30;
pub const SLOT_WIDTH_PX: f64 = 200.0;
pub const MIN_PROGRAM_WIDTH_PX: f64 = 50.0;
pub const PROGRAM_GAP_PX: f64 = 4.0;
pub const ROW_HEIGHT_PX: f64 = 60.0;
/// Rows rendered above and below the viewport
pub const DEFAULT_OVERSCAN: usize = 5;
