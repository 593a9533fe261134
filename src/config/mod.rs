use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::guide::{DEFAULT_OVERSCAN, GuideGeometry};
use crate::utils::DateTimeParser;

pub mod defaults;
pub mod duration_serde;

pub use defaults::*;

use duration_serde::duration::parse_default;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub guide: GuideConfig,
    #[serde(default)]
    pub layout: GuideGeometry,
    #[serde(default)]
    pub print: PrintConfig,
}

/// Where guide data is fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_channels_path")]
    pub channels_path: String,
    #[serde(default = "default_epg_entries_path")]
    pub epg_entries_path: String,
    #[serde(default = "default_programs_path")]
    pub programs_path: String,
    /// Sent as a bearer token when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(
        default = "default_request_timeout",
        with = "duration_serde::duration"
    )]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideConfig {
    /// IANA name used to build windows and render clock labels
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// How often the "now" marker and airing flags are recomputed
    #[serde(
        default = "default_now_refresh_interval",
        with = "duration_serde::duration"
    )]
    pub now_refresh_interval: Duration,
    /// How often programs are reloaded from the source
    #[serde(default = "default_poll_interval", with = "duration_serde::duration")]
    pub poll_interval: Duration,
    /// Extra rows rendered above and below the viewport
    #[serde(default = "default_overscan")]
    pub overscan: usize,
    #[serde(default = "default_viewport_height_px")]
    pub viewport_height_px: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintConfig {
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
    #[serde(default = "default_hours_per_page")]
    pub hours_per_page: i64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_channels_path() -> String {
    DEFAULT_CHANNELS_PATH.to_string()
}
fn default_epg_entries_path() -> String {
    DEFAULT_EPG_ENTRIES_PATH.to_string()
}
fn default_programs_path() -> String {
    DEFAULT_PROGRAMS_PATH.to_string()
}
fn default_request_timeout() -> Duration {
    parse_default(DEFAULT_REQUEST_TIMEOUT)
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_now_refresh_interval() -> Duration {
    parse_default(DEFAULT_NOW_REFRESH_INTERVAL)
}
fn default_poll_interval() -> Duration {
    parse_default(DEFAULT_POLL_INTERVAL)
}
fn default_overscan() -> usize {
    DEFAULT_OVERSCAN
}
fn default_viewport_height_px() -> f64 {
    DEFAULT_VIEWPORT_HEIGHT_PX
}
fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}
fn default_hours_per_page() -> i64 {
    DEFAULT_HOURS_PER_PAGE
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            channels_path: default_channels_path(),
            epg_entries_path: default_epg_entries_path(),
            programs_path: default_programs_path(),
            api_token: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            now_refresh_interval: default_now_refresh_interval(),
            poll_interval: default_poll_interval(),
            overscan: default_overscan(),
            viewport_height_px: default_viewport_height_px(),
        }
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
            hours_per_page: default_hours_per_page(),
        }
    }
}

impl GuideConfig {
    pub fn tz(&self) -> AppResult<Tz> {
        DateTimeParser::parse_timezone(&self.timezone)
            .map_err(|e| AppError::configuration(format!("guide.timezone: {e}")))
    }
}

impl Config {
    /// Config file to use: `explicit` first, then `CONFIG_FILE` from `lookup`,
    /// then [`DEFAULT_CONFIG_FILE`]
    pub fn resolve_path<F>(explicit: Option<&Path>, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        lookup(ENV_CONFIG_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Read `config_file`, writing the defaults there first when it is missing
    pub fn load_from_file(config_file: impl AsRef<Path>) -> Result<Self> {
        let config_file = config_file.as_ref();
        let mut config = if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Config = toml::from_str(&contents)?;
            debug!("Loaded config file: {}", config_file.display());
            config
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            default_config
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `EPG_GUIDE_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides source.base_url", ENV_BASE_URL);
            self.source.base_url = base_url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides source.api_token", ENV_API_TOKEN);
            self.source.api_token = Some(token);
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.guide.tz()?;

        if self.guide.now_refresh_interval.is_zero() {
            return Err(AppError::configuration(
                "guide.now_refresh_interval must be greater than zero",
            ));
        }
        if self.guide.poll_interval.is_zero() {
            return Err(AppError::configuration(
                "guide.poll_interval must be greater than zero",
            ));
        }
        if self.layout.slot_minutes <= 0 {
            return Err(AppError::configuration(
                "layout.slot_minutes must be greater than zero",
            ));
        }
        if self.layout.slot_width_px <= 0.0 || self.layout.row_height_px <= 0.0 {
            return Err(AppError::configuration(
                "layout.slot_width_px and layout.row_height_px must be positive",
            ));
        }
        if self.print.rows_per_page == 0 || self.print.hours_per_page <= 0 {
            return Err(AppError::configuration(
                "print.rows_per_page and print.hours_per_page must be greater than zero",
            ));
        }
        Ok(())
    }
}
