//! URL utilities for building backend endpoint URLs
//!
//! Backend base URLs are user input: they may lack a scheme, carry a path
//! prefix (reverse proxies), or embed credentials that must never be logged.

use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Ensure a URL has an HTTP/HTTPS scheme, defaulting to HTTP
    ///
    /// ```rust
    /// use epg_guide::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::normalize_scheme("example.com"), "http://example.com");
    /// assert_eq!(UrlUtils::normalize_scheme("https://example.com"), "https://example.com");
    /// ```
    pub fn normalize_scheme(url: &str) -> String {
        let trimmed = url.trim();

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        }
    }

    /// Join an API path onto a base URL, keeping any path prefix of the base
    ///
    /// `http://host/guide` + `/api/epg/grid/` gives `http://host/guide/api/epg/grid/`.
    pub fn endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
        let normalized = Self::normalize_scheme(base);
        let mut base_url = Url::parse(&normalized)?;
        if !base_url.path().ends_with('/') {
            let with_slash = format!("{}/", base_url.path());
            base_url.set_path(&with_slash);
        }
        base_url.join(path.trim_start_matches('/'))
    }

    /// Replace embedded credentials and sensitive query values with `****`
    pub fn obfuscate_credentials(url: &str) -> String {
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        if !parsed.username().is_empty() || parsed.password().is_some() {
            let _ = parsed.set_username("****");
            let _ = parsed.set_password(Some("****"));
        }

        let sensitive_params = ["token", "api_key", "password", "pass", "username", "user"];
        let has_sensitive = parsed
            .query_pairs()
            .any(|(key, _)| sensitive_params.contains(&key.to_ascii_lowercase().as_str()));
        if has_sensitive {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(key, value)| {
                    if sensitive_params.contains(&key.to_ascii_lowercase().as_str()) {
                        (key.into_owned(), "****".to_string())
                    } else {
                        (key.into_owned(), value.into_owned())
                    }
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
        }

        parsed.to_string()
    }
}
