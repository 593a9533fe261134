//! Program normalization at the ingestion boundary
//!
//! Guide payloads come from two schema generations: current payloads carry
//! `start_time` / `end_time`, older ones `start` / `end` (XMLTV-derived data
//! sometimes uses `stop`). Timestamps may be strings in several formats or
//! epoch numbers. Everything is folded into [`Program`] here so that the guide
//! core only ever sees one canonical representation with `start < end`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::IngestError;
use crate::models::Program;
use crate::utils::datetime::{DateTimeError, DateTimeParser};

/// A program as delivered by a backend, before normalization
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawProgram {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    /// Legacy name for `start_time`
    #[serde(default)]
    pub start: Option<Value>,
    /// Legacy name for `end_time`
    #[serde(default)]
    pub end: Option<Value>,
    /// XMLTV name for `end_time`
    #[serde(default)]
    pub stop: Option<Value>,
    #[serde(default)]
    pub tvg_id: Option<String>,
}

/// Outcome of normalizing a batch
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub programs: Vec<Program>,
    pub rejected: Vec<IngestError>,
}

impl NormalizeReport {
    pub fn accepted_count(&self) -> usize {
        self.programs.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

impl RawProgram {
    /// Identifier as a string; numeric ids are rendered without quotes
    pub fn id_string(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Normalize into a [`Program`], rejecting missing or invalid timestamps
    pub fn normalize(self) -> Result<Program, IngestError> {
        let program_id = self.id_string();

        let start_time = pick_timestamp(
            &program_id,
            "start",
            [self.start_time.as_ref(), self.start.as_ref()],
        )?;
        let end_time = pick_timestamp(
            &program_id,
            "end",
            [self.end_time.as_ref(), self.end.as_ref(), self.stop.as_ref()],
        )?;

        if end_time <= start_time {
            return Err(IngestError::EmptyInterval {
                program_id,
                start: start_time.to_rfc3339(),
                end: end_time.to_rfc3339(),
            });
        }

        Ok(Program {
            id: program_id,
            title: self
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_default(),
            sub_title: self.sub_title.filter(|s| !s.trim().is_empty()),
            description: self.description.filter(|d| !d.trim().is_empty()),
            start_time,
            end_time,
            tvg_id: self.tvg_id.map(|k| k.trim().to_string()).unwrap_or_default(),
        })
    }
}

/// First present candidate wins; the current field name is listed first
fn pick_timestamp<const N: usize>(
    program_id: &str,
    field: &'static str,
    candidates: [Option<&Value>; N],
) -> Result<DateTime<Utc>, IngestError> {
    let value = candidates
        .into_iter()
        .flatten()
        .find(|v| !is_blank(v))
        .ok_or_else(|| IngestError::MissingTimestamp {
            program_id: program_id.to_string(),
            field,
        })?;

    parse_timestamp(value).map_err(|source| IngestError::InvalidTimestamp {
        program_id: program_id.to_string(),
        field,
        source,
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, DateTimeError> {
    match value {
        Value::String(s) => DateTimeParser::parse_flexible(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
            .ok_or_else(|| DateTimeError::InvalidFormat {
                input: n.to_string(),
            }),
        other => Err(DateTimeError::InvalidFormat {
            input: other.to_string(),
        }),
    }
}

/// Normalize a batch, dropping programs that fail with a warning
pub fn normalize_programs<I>(raw: I) -> NormalizeReport
where
    I: IntoIterator<Item = RawProgram>,
{
    let mut report = NormalizeReport::default();

    for program in raw {
        match program.normalize() {
            Ok(program) => report.programs.push(program),
            Err(e) => {
                debug!("Rejected program: {}", e);
                report.rejected.push(e);
            }
        }
    }

    if !report.rejected.is_empty() {
        warn!(
            "Dropped {} of {} programs with missing or invalid timestamps",
            report.rejected_count(),
            report.rejected_count() + report.accepted_count()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tracing_test::traced_test;

    fn raw(value: Value) -> RawProgram {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_current_field_names() {
        let program = raw(json!({
            "id": 17,
            "title": " News ",
            "start_time": "2024-03-01T09:00:00Z",
            "end_time": "2024-03-01T09:30:00Z",
            "tvg_id": "bbc1.uk"
        }))
        .normalize()
        .unwrap();

        assert_eq!(program.id, "17");
        assert_eq!(program.title, "News");
        assert_eq!(program.start_time, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        assert_eq!(program.end_time, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        assert_eq!(program.tvg_id, "bbc1.uk");
    }

    #[test]
    fn test_legacy_field_names() {
        let program = raw(json!({
            "id": "abc",
            "title": "Film",
            "start": "20240301210000 +0100",
            "stop": "20240301230000 +0100",
            "tvg_id": "film4.uk"
        }))
        .normalize()
        .unwrap();

        assert_eq!(program.start_time, Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap());
        assert_eq!(program.end_time, Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_current_name_wins_when_both_present() {
        let program = raw(json!({
            "id": 1,
            "start_time": "2024-03-01T10:00:00Z",
            "start": "2024-03-01T08:00:00Z",
            "end_time": 1709290800,
            "end": "2024-03-01T09:00:00Z",
            "tvg_id": "k"
        }))
        .normalize()
        .unwrap();

        assert_eq!(program.start_time, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        assert_eq!(program.end_time, Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_blank_current_value_falls_back_to_legacy() {
        let program = raw(json!({
            "id": 1,
            "start_time": "",
            "start": "2024-03-01T08:00:00Z",
            "end": "2024-03-01T09:00:00Z",
            "tvg_id": "k"
        }))
        .normalize()
        .unwrap();
        assert_eq!(program.start_time, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let err = raw(json!({"id": 5, "start_time": "2024-03-01T08:00:00Z", "tvg_id": "k"}))
            .normalize()
            .unwrap_err();
        assert_eq!(
            err,
            IngestError::MissingTimestamp {
                program_id: "5".to_string(),
                field: "end"
            }
        );
    }

    #[test]
    fn test_invalid_and_empty_interval_rejected() {
        let err = raw(json!({"id": "x", "start": "soon", "end": "later"}))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidTimestamp { field: "start", .. }));

        let err = raw(json!({
            "id": "y",
            "start_time": "2024-03-01T09:00:00Z",
            "end_time": "2024-03-01T09:00:00Z"
        }))
        .normalize()
        .unwrap_err();
        assert!(matches!(err, IngestError::EmptyInterval { .. }));
        assert_eq!(err.program_id(), "y");
    }

    #[traced_test]
    #[test]
    fn test_normalize_programs_drops_invalid() {
        let report = normalize_programs(vec![
            raw(json!({
                "id": 1,
                "start_time": "2024-03-01T09:00:00Z",
                "end_time": "2024-03-01T09:30:00Z",
                "tvg_id": "k"
            })),
            raw(json!({"id": 2, "tvg_id": "k"})),
        ]);

        assert_eq!(report.accepted_count(), 1);
        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.rejected[0].program_id(), "2");
        assert!(logs_contain("Dropped 1 of 2 programs"));
    }
}
