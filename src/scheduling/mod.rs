//! Timers around the guide: periodic tasks, the "now" ticker and program refresh
//!
//! Everything here is driven by tokio and stops through a
//! [`tokio_util::sync::CancellationToken`] held by a [`TaskHandle`].

pub mod clock;
pub mod now_ticker;
pub mod periodic;
pub mod refresh;

pub use clock::{Clock, ManualClock, SystemClock};
pub use now_ticker::NowTicker;
pub use periodic::{TaskHandle, Visibility, schedule, schedule_while_visible};
pub use refresh::{RefreshPoller, follow_now, refresh_programs};
