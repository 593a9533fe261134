use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppResult;
use crate::guide::GuideView;
use crate::ingestor::NormalizeReport;
use crate::models::ProgramRange;
use crate::scheduling::{TaskHandle, Visibility, schedule_while_visible};
use crate::sources::{GuideDataSource, load_programs};

/// Reload programs for the view's current window and rebuild its index
pub async fn refresh_programs(
    source: &dyn GuideDataSource,
    view: &RwLock<GuideView>,
) -> AppResult<NormalizeReport> {
    let range = ProgramRange::from(view.read().await.window());
    let mut report = load_programs(source, range).await?;

    let programs = std::mem::take(&mut report.programs);
    let accepted = programs.len();
    view.write().await.set_programs(programs);

    info!(
        "Refreshed guide programs: {} accepted, {} rejected",
        accepted,
        report.rejected_count()
    );
    Ok(report)
}

/// Advance the view's clock to `now`, following it into the next window
///
/// Once `now` runs past the end of the displayed window the view jumps to the
/// window containing `now` and its programs are reloaded for that range.
/// Returns whether the window moved. On a failed reload the window has still
/// moved and keeps the previous programs.
pub async fn follow_now(
    source: &dyn GuideDataSource,
    view: &RwLock<GuideView>,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    let moved = {
        let mut guard = view.write().await;
        guard.set_now(now);
        if guard.now_marker_offset().is_none() && now > guard.window().start {
            guard.jump_to_now();
            true
        } else {
            false
        }
    };

    if moved {
        refresh_programs(source, view).await?;
    }
    Ok(moved)
}

/// Periodic program reload while the guide is visible
pub struct RefreshPoller {
    handle: TaskHandle,
}

impl RefreshPoller {
    pub fn start(
        source: Arc<dyn GuideDataSource>,
        view: Arc<RwLock<GuideView>>,
        every: Duration,
        visibility: &Visibility,
    ) -> Self {
        info!(
            "Starting guide refresh every {}",
            humantime::format_duration(every)
        );

        let handle = schedule_while_visible(every, visibility, move || {
            let source = source.clone();
            let view = view.clone();
            async move {
                if let Err(e) = refresh_programs(source.as_ref(), &view).await {
                    warn!("Guide refresh failed, keeping previous programs: {}", e);
                }
            }
        });

        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_cancelled()
    }
}
