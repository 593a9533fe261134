//! Cancellable repeating tasks
//!
//! [`schedule`] runs a task every `interval` until its [`TaskHandle`] is
//! cancelled or dropped. [`schedule_while_visible`] additionally pauses while a
//! [`Visibility`] flag is off and fires once as soon as it turns back on.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Owns a scheduled task; cancelling or dropping it stops the task
#[derive(Debug)]
pub struct TaskHandle {
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the task loop to exit
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take()
            && let Err(e) = join.await
        {
            debug!("Scheduled task ended abnormally: {}", e);
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Shared on/off flag for tasks that should idle while nobody is looking
#[derive(Debug, Clone)]
pub struct Visibility {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Visibility {
    pub fn new(visible: bool) -> Self {
        let (tx, _rx) = watch::channel(visible);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_visible(&self, visible: bool) {
        let previous = self.tx.send_replace(visible);
        if previous != visible {
            debug!("Visibility changed: {} -> {}", previous, visible);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Run `task` every `every`, first after one full interval
pub fn schedule<F, Fut>(every: Duration, mut task: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let loop_token = token.clone();

    let join = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = loop_token.cancelled() => break,
                _ = ticker.tick() => {
                    trace!("Scheduled task tick");
                    task().await;
                }
            }
        }
        debug!("Scheduled task stopped");
    });

    TaskHandle {
        token,
        join: Some(join),
    }
}

/// Like [`schedule`], but idle while `visibility` is off
///
/// Turning visibility back on runs the task immediately and restarts the
/// interval from that moment.
pub fn schedule_while_visible<F, Fut>(
    every: Duration,
    visibility: &Visibility,
    mut task: F,
) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let loop_token = token.clone();
    // Keep the sender alive for as long as the loop runs
    let visibility = visibility.clone();
    let mut visible_rx = visibility.subscribe();

    let join = tokio::spawn(async move {
        let _visibility = visibility;
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let visible = *visible_rx.borrow_and_update();

            if !visible {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    changed = visible_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *visible_rx.borrow_and_update() {
                            trace!("Visible again, running task now");
                            task().await;
                            ticker.reset();
                        }
                    }
                }
                continue;
            }

            tokio::select! {
                biased;
                _ = loop_token.cancelled() => break,
                changed = visible_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    trace!("Scheduled task tick");
                    task().await;
                }
            }
        }
        debug!("Visibility-gated task stopped");
    });

    TaskHandle {
        token,
        join: Some(join),
    }
}
