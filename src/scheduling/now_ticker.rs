use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::scheduling::{Clock, TaskHandle, Visibility, schedule_while_visible};

/// Republishes the current time every `every` while the guide is visible
///
/// Subscribers recompute the "now" marker and airing flags when the value
/// changes. Dropping the ticker stops it.
pub struct NowTicker {
    rx: watch::Receiver<DateTime<Utc>>,
    handle: TaskHandle,
}

impl NowTicker {
    pub fn start(clock: Arc<dyn Clock>, every: Duration, visibility: &Visibility) -> Self {
        let (tx, rx) = watch::channel(clock.now());
        debug!("Starting now ticker every {}", humantime::format_duration(every));

        let handle = schedule_while_visible(every, visibility, move || {
            tx.send_replace(clock.now());
            std::future::ready(())
        });

        Self { rx, handle }
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DateTime<Utc>> {
        self.rx.clone()
    }

    pub fn stop(&self) {
        self.handle.cancel();
    }
}
