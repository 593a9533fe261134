use async_trait::async_trait;

use crate::errors::AppResult;
use crate::ingestor::RawProgram;
use crate::models::{Channel, EpgDataEntry, ProgramRange};

/// Where the guide gets its snapshots from
///
/// Programs are returned raw; callers pass them through
/// [`crate::ingestor::normalize_programs`] before indexing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuideDataSource: Send + Sync {
    async fn fetch_channels(&self) -> AppResult<Vec<Channel>>;

    async fn fetch_epg_entries(&self) -> AppResult<Vec<EpgDataEntry>>;

    async fn fetch_programs(&self, range: ProgramRange) -> AppResult<Vec<RawProgram>>;
}
