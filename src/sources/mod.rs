//! Guide data sources
//!
//! The guide core never fetches anything itself. Channel, EPG entry and program
//! snapshots come through a [`GuideDataSource`]; [`load_snapshot`] pulls all
//! three and normalizes programs at the ingestion boundary.

pub mod fixture;
pub mod http;
pub mod traits;

pub use fixture::StaticGuideSource;
pub use http::HttpGuideSource;
pub use traits::GuideDataSource;

#[cfg(test)]
pub use traits::MockGuideDataSource;

use tracing::info;

use crate::errors::AppResult;
use crate::ingestor::{NormalizeReport, normalize_programs};
use crate::models::{Channel, EpgDataEntry, Program, ProgramRange};

/// Everything needed to (re)build a guide view
#[derive(Debug, Clone, Default)]
pub struct GuideSnapshot {
    pub channels: Vec<Channel>,
    pub epg_entries: Vec<EpgDataEntry>,
    pub programs: Vec<Program>,
    pub rejected_programs: usize,
}

/// Fetch channels, EPG entries and normalized programs for `range`
pub async fn load_snapshot(
    source: &dyn GuideDataSource,
    range: ProgramRange,
) -> AppResult<GuideSnapshot> {
    let channels = source.fetch_channels().await?;
    let epg_entries = source.fetch_epg_entries().await?;
    let report = load_programs(source, range).await?;

    info!(
        "Guide snapshot: {} channels, {} EPG entries, {} programs",
        channels.len(),
        epg_entries.len(),
        report.accepted_count()
    );

    Ok(GuideSnapshot {
        channels,
        epg_entries,
        rejected_programs: report.rejected_count(),
        programs: report.programs,
    })
}

/// Fetch and normalize programs only
pub async fn load_programs(
    source: &dyn GuideDataSource,
    range: ProgramRange,
) -> AppResult<NormalizeReport> {
    let raw = source.fetch_programs(range).await?;
    Ok(normalize_programs(raw))
}
