//! Guide data over HTTP/JSON
//!
//! Talks to a Dispatcharr-style backend. List endpoints either return a bare
//! JSON array or wrap it as `{"data": [...]}` / `{"results": [...]}`; all three
//! shapes are accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::config::SourceConfig;
use crate::errors::{AppError, AppResult, SourceError};
use crate::ingestor::RawProgram;
use crate::models::{Channel, EpgDataEntry, ProgramRange};
use crate::sources::GuideDataSource;
use crate::utils::datetime::DateTimeParser;
use crate::utils::url::UrlUtils;

#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Results { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Data { data: items } | Self::Results { results: items } => {
                items
            }
        }
    }
}

pub struct HttpGuideSource {
    client: Client,
    channels_url: Url,
    epg_entries_url: Url,
    programs_url: Url,
    api_token: Option<String>,
}

impl HttpGuideSource {
    pub fn new(config: &SourceConfig) -> AppResult<Self> {
        let base_url = config.base_url.trim();
        if base_url.is_empty() {
            return Err(SourceError::invalid_config("base_url", "must not be empty").into());
        }

        let endpoint = |path: &str| {
            UrlUtils::endpoint(base_url, path)
                .map_err(|e| AppError::from(SourceError::invalid_config("base_url", e.to_string())))
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            channels_url: endpoint(&config.channels_path)?,
            epg_entries_url: endpoint(&config.epg_entries_path)?,
            programs_url: endpoint(&config.programs_path)?,
            api_token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, url: Url) -> AppResult<Vec<T>> {
        let display_url = UrlUtils::obfuscate_credentials(url.as_str());
        debug!("Fetching {}", display_url);

        let response = self.authorize(self.client.get(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: display_url,
            }
            .into());
        }

        let bytes = response.bytes().await?;
        let list: ListResponse<T> =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::ParseError {
                endpoint: display_url.clone(),
                message: e.to_string(),
            })?;
        let items = list.into_vec();
        debug!("Fetched {} items from {}", items.len(), display_url);
        Ok(items)
    }
}

#[async_trait]
impl GuideDataSource for HttpGuideSource {
    async fn fetch_channels(&self) -> AppResult<Vec<Channel>> {
        self.fetch_list(self.channels_url.clone()).await
    }

    async fn fetch_epg_entries(&self) -> AppResult<Vec<EpgDataEntry>> {
        self.fetch_list(self.epg_entries_url.clone()).await
    }

    async fn fetch_programs(&self, range: ProgramRange) -> AppResult<Vec<RawProgram>> {
        let mut url = self.programs_url.clone();
        url.query_pairs_mut()
            .append_pair("start", &DateTimeParser::format_for_api(&range.start))
            .append_pair("end", &DateTimeParser::format_for_api(&range.end));

        let programs: Vec<RawProgram> = self.fetch_list(url).await?;
        info!(
            "Loaded {} raw programs for {} .. {}",
            programs.len(),
            range.start,
            range.end
        );
        Ok(programs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_shapes() {
        let bare: ListResponse<u32> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2]);

        let data: ListResponse<u32> = serde_json::from_str(r#"{"data":[3]}"#).unwrap();
        assert_eq!(data.into_vec(), vec![3]);

        let results: ListResponse<u32> =
            serde_json::from_str(r#"{"count":1,"results":[4]}"#).unwrap();
        assert_eq!(results.into_vec(), vec![4]);
    }

    #[test]
    fn test_new_builds_endpoints() {
        let config = SourceConfig {
            base_url: "guide.local:9191/".to_string(),
            ..SourceConfig::default()
        };
        let source = HttpGuideSource::new(&config).unwrap();
        assert_eq!(
            source.programs_url.as_str(),
            "http://guide.local:9191/api/epg/grid/"
        );
        assert_eq!(
            source.channels_url.as_str(),
            "http://guide.local:9191/api/channels/channels/"
        );
    }

    #[test]
    fn test_new_rejects_empty_base_url() {
        let config = SourceConfig {
            base_url: "  ".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(
            HttpGuideSource::new(&config),
            Err(AppError::Source(SourceError::InvalidConfig { .. }))
        ));
    }
}
