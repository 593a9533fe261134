//! In-memory guide data, optionally loaded from a JSON snapshot file
//!
//! The snapshot uses the same shapes as the HTTP backend:
//!
//! ```json
//! { "channels": [...], "epg_entries": [...], "programs": [...] }
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppResult;
use crate::ingestor::RawProgram;
use crate::models::{Channel, EpgDataEntry, ProgramRange};
use crate::sources::GuideDataSource;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticGuideSource {
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default, alias = "epgdata")]
    pub epg_entries: Vec<EpgDataEntry>,
    #[serde(default)]
    pub programs: Vec<RawProgram>,
}

impl StaticGuideSource {
    pub fn new(
        channels: Vec<Channel>,
        epg_entries: Vec<EpgDataEntry>,
        programs: Vec<RawProgram>,
    ) -> Self {
        Self {
            channels,
            epg_entries,
            programs,
        }
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let source = Self::from_json(&contents)?;
        info!(
            "Loaded guide snapshot {}: {} channels, {} EPG entries, {} programs",
            path.display(),
            source.channels.len(),
            source.epg_entries.len(),
            source.programs.len()
        );
        Ok(source)
    }
}

#[async_trait]
impl GuideDataSource for StaticGuideSource {
    async fn fetch_channels(&self) -> AppResult<Vec<Channel>> {
        Ok(self.channels.clone())
    }

    async fn fetch_epg_entries(&self) -> AppResult<Vec<EpgDataEntry>> {
        Ok(self.epg_entries.clone())
    }

    /// The whole snapshot; the guide filters by window itself
    async fn fetch_programs(&self, _range: ProgramRange) -> AppResult<Vec<RawProgram>> {
        Ok(self.programs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "channels": [
            {"id": 1, "channel_number": 1, "name": "One", "tvg_id": "one.uk", "epg_data_id": 3}
        ],
        "epgdata": [
            {"id": 3, "tvg_id": "one.epg", "name": "One EPG"}
        ],
        "programs": [
            {"id": 9, "title": "News", "start": "2024-03-01T09:00:00Z", "end": "2024-03-01T09:30:00Z", "tvg_id": "one.epg"}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let source = StaticGuideSource::from_json(SNAPSHOT).unwrap();
        assert_eq!(source.channels[0].channel_number, Some(1.0));
        assert_eq!(source.epg_entries[0].tvg_id.as_deref(), Some("one.epg"));
        assert_eq!(source.programs.len(), 1);
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let source = StaticGuideSource::from_file(file.path()).await.unwrap();
        let channels = source.fetch_channels().await.unwrap();
        assert_eq!(channels[0].name, "One");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = StaticGuideSource::from_file("/nonexistent/guide.json").await;
        assert!(matches!(result, Err(crate::errors::AppError::Io(_))));
    }
}
