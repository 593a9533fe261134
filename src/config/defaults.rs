/// Configuration default values
///
/// Every default the config layer falls back to lives here.
// Source defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:9191";
pub const DEFAULT_CHANNELS_PATH: &str = "/api/channels/channels/";
pub const DEFAULT_EPG_ENTRIES_PATH: &str = "/api/epg/epgdata/";
pub const DEFAULT_PROGRAMS_PATH: &str = "/api/epg/grid/";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";

// Guide defaults
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_NOW_REFRESH_INTERVAL: &str = "5m";
pub const DEFAULT_POLL_INTERVAL: &str = "15m";
pub const DEFAULT_VIEWPORT_HEIGHT_PX: f64 = 600.0;

// Print defaults
pub const DEFAULT_ROWS_PER_PAGE: usize = 20;
pub const DEFAULT_HOURS_PER_PAGE: i64 = 3;

// Environment overrides
pub const ENV_BASE_URL: &str = "EPG_GUIDE_BASE_URL";
pub const ENV_API_TOKEN: &str = "EPG_GUIDE_API_TOKEN";
pub const ENV_CONFIG_FILE: &str = "CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
