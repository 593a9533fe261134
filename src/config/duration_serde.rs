//! Serde helpers for human-readable durations in configuration.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// `Duration` as a humantime string (`"5m"`, `"1h30m"`) or whole seconds
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as seconds (number) or human-readable string (e.g., '30s', '5m')",
                )
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| de::Error::custom(format!("Negative duration: {seconds}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }

    /// Parse one of the string defaults in `config::defaults`
    pub(crate) fn parse_default(value: &str) -> Duration {
        humantime::parse_duration(value).unwrap_or(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "duration")]
        every: Duration,
    }

    #[test]
    fn test_human_readable_string() {
        let holder: Holder = toml::from_str(r#"every = "1h30m""#).unwrap();
        assert_eq!(holder.every, Duration::from_secs(5400));
    }

    #[test]
    fn test_plain_seconds() {
        let holder: Holder = toml::from_str("every = 90").unwrap();
        assert_eq!(holder.every, Duration::from_secs(90));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(toml::from_str::<Holder>(r#"every = "soon""#).is_err());
        assert!(toml::from_str::<Holder>("every = -5").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let holder = Holder {
            every: Duration::from_secs(300),
        };
        let out = toml::to_string(&holder).unwrap();
        assert!(out.contains(r#"every = "5m""#));
    }
}
