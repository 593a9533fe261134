//! Program index and channel-to-program resolution
//!
//! Channel identity and guide identity are maintained by different backend
//! systems, so a channel can be matched to its programs by several keys. The
//! lookup order is expressed as data in [`RESOLUTION_TIERS`]:
//!
//! 1. the `tvg_id` of the EPG entry the channel's `epg_data_id` points at,
//!    otherwise the channel's own `tvg_id`;
//! 2. when that finds nothing, the channel UUID (dummy sources key their
//!    generated programs by channel UUID).
//!
//! The first tier that yields programs wins; tiers are never merged.

use std::collections::HashMap;

use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::{debug, trace};

use crate::models::{Channel, EpgDataEntry, EpgDataId, Program, TimeWindow};

/// Programs grouped by identity key, each group sorted by start time
#[derive(Debug, Clone, Default)]
pub struct ProgramIndex {
    by_key: HashMap<String, Vec<Program>>,
    program_count: usize,
}

impl ProgramIndex {
    pub fn get(&self, key: &str) -> &[Program] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    pub fn program_count(&self) -> usize {
        self.program_count
    }

    pub fn is_empty(&self) -> bool {
        self.program_count == 0
    }
}

/// Group programs by `tvg_id`, sorting each group by start time
///
/// The sort is stable, so programs sharing a start time keep their input order.
/// Programs with a blank key cannot be matched to any channel and are skipped.
pub fn build_index<I>(programs: I) -> ProgramIndex
where
    I: IntoIterator<Item = Program>,
{
    let mut by_key: HashMap<String, Vec<Program>> = HashMap::new();
    let mut skipped = 0usize;

    for program in programs {
        if program.tvg_id.trim().is_empty() {
            skipped += 1;
            continue;
        }
        by_key.entry(program.tvg_id.clone()).or_default().push(program);
    }

    let mut program_count = 0;
    for group in by_key.values_mut() {
        group.sort_by_key(|p| p.start_time);
        program_count += group.len();
    }

    if skipped > 0 {
        debug!("Skipped {} programs without an identity key", skipped);
    }
    debug!(
        "Built program index: {} programs across {} keys",
        program_count,
        by_key.len()
    );

    ProgramIndex {
        by_key,
        program_count,
    }
}

/// Map EPG entries by id for the `epg_data_id` indirection
pub fn index_epg_entries<I>(entries: I) -> HashMap<EpgDataId, EpgDataEntry>
where
    I: IntoIterator<Item = EpgDataEntry>,
{
    entries.into_iter().map(|entry| (entry.id, entry)).collect()
}

/// One way of deriving a lookup key from a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// `tvg_id` of the EPG entry referenced by `channel.epg_data_id`
    EpgDataTvgId,
    /// The channel's own `tvg_id`
    ChannelTvgId,
    /// The channel UUID, used by dummy sources
    ChannelUuid,
}

impl KeyStrategy {
    /// Key this strategy derives for `channel`, if any
    ///
    /// Keys are trimmed the same way ingested program `tvg_id`s are.
    pub fn extract(
        self,
        channel: &Channel,
        epg_entries: &HashMap<EpgDataId, EpgDataEntry>,
    ) -> Option<String> {
        let key = match self {
            Self::EpgDataTvgId => channel
                .epg_data_id
                .and_then(|id| epg_entries.get(&id))
                .and_then(|entry| entry.tvg_id.clone()),
            Self::ChannelTvgId => channel.tvg_id.clone(),
            Self::ChannelUuid => channel.uuid.map(|uuid| uuid.to_string()),
        };
        key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
    }
}

/// Lookup tiers in priority order
///
/// Within a tier the first strategy that produces a key is used, even when that
/// key matches nothing. The next tier is only tried when the current one finds
/// no programs.
pub const RESOLUTION_TIERS: &[&[KeyStrategy]] = &[
    &[KeyStrategy::EpgDataTvgId, KeyStrategy::ChannelTvgId],
    &[KeyStrategy::ChannelUuid],
];

/// The key that matched a channel to its programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub strategy: KeyStrategy,
    pub key: String,
}

/// Pick the key for `channel`: first tier whose key has programs in `index`
pub fn resolve_program_key(
    channel: &Channel,
    epg_entries: &HashMap<EpgDataId, EpgDataEntry>,
    index: &ProgramIndex,
) -> Option<ResolvedKey> {
    for tier in RESOLUTION_TIERS {
        let Some((strategy, key)) = tier
            .iter()
            .find_map(|strategy| strategy.extract(channel, epg_entries).map(|key| (*strategy, key)))
        else {
            continue;
        };

        if index.get(&key).is_empty() {
            trace!(
                "Channel {} ({}): no programs for {} key '{}'",
                channel.id, channel.name, strategy, key
            );
            continue;
        }

        return Some(ResolvedKey { strategy, key });
    }

    None
}

/// Programs of `channel` that overlap `window`, in start order
///
/// Empty when no tier matches; the caller renders a "no program data" row.
pub fn resolve_channel_programs<'a>(
    channel: &Channel,
    epg_entries: &HashMap<EpgDataId, EpgDataEntry>,
    index: &'a ProgramIndex,
    window: &TimeWindow,
) -> Vec<&'a Program> {
    let Some(resolved) = resolve_program_key(channel, epg_entries, index) else {
        return Vec::new();
    };

    index
        .get(&resolved.key)
        .iter()
        .filter(|program| program.overlaps(window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn program(id: &str, key: &str, start: DateTime<Utc>, minutes: i64) -> Program {
        Program {
            id: id.to_string(),
            title: format!("Program {id}"),
            sub_title: None,
            description: None,
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            tvg_id: key.to_string(),
        }
    }

    fn channel() -> Channel {
        Channel {
            id: 1,
            channel_number: Some(1.0),
            name: "One".to_string(),
            tvg_id: None,
            uuid: None,
            epg_data_id: None,
            channel_group: None,
            logo_id: None,
        }
    }

    fn entry(id: EpgDataId, tvg_id: Option<&str>) -> EpgDataEntry {
        EpgDataEntry {
            id,
            tvg_id: tvg_id.map(str::to_string),
            name: None,
            icon_url: None,
            epg_source: None,
        }
    }

    fn window() -> TimeWindow {
        TimeWindow::new(at(9, 0), at(15, 0))
    }

    #[test]
    fn test_build_index_groups_and_sorts() {
        let index = build_index(vec![
            program("b", "one.uk", at(11, 0), 60),
            program("a", "one.uk", at(9, 0), 60),
            program("c", "two.uk", at(10, 0), 30),
        ]);
        assert_eq!(index.key_count(), 2);
        assert_eq!(index.program_count(), 3);
        let ids: Vec<&str> = index.get("one.uk").iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(index.get("missing").is_empty());
    }

    #[test]
    fn test_build_index_stable_for_equal_starts() {
        let index = build_index(vec![
            program("first", "k", at(10, 0), 30),
            program("early", "k", at(9, 0), 30),
            program("second", "k", at(10, 0), 15),
        ]);
        let ids: Vec<&str> = index.get("k").iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_build_index_skips_blank_keys() {
        let index = build_index(vec![program("a", "  ", at(9, 0), 30)]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_epg_entry_tvg_id_wins_over_channel_tvg_id() {
        let uuid = Uuid::new_v4();
        let mut ch = channel();
        ch.tvg_id = Some("channel.tvg".to_string());
        ch.epg_data_id = Some(7);
        ch.uuid = Some(uuid);

        let entries = index_epg_entries(vec![entry(7, Some("entry.tvg"))]);
        let index = build_index(vec![
            program("from-entry", "entry.tvg", at(10, 0), 30),
            program("from-channel", "channel.tvg", at(10, 0), 30),
            program("from-uuid", &uuid.to_string(), at(10, 0), 30),
        ]);

        let resolved = resolve_program_key(&ch, &entries, &index).unwrap();
        assert_eq!(resolved.strategy, KeyStrategy::EpgDataTvgId);
        assert_eq!(resolved.key, "entry.tvg");

        let programs = resolve_channel_programs(&ch, &entries, &index, &window());
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].id, "from-entry");
    }

    #[test]
    fn test_unresolvable_epg_data_id_falls_back_to_channel_tvg_id() {
        let mut ch = channel();
        ch.tvg_id = Some("channel.tvg".to_string());
        ch.epg_data_id = Some(99);

        let entries = index_epg_entries(vec![entry(7, Some("entry.tvg"))]);
        let index = build_index(vec![program("p", "channel.tvg", at(10, 0), 30)]);

        let resolved = resolve_program_key(&ch, &entries, &index).unwrap();
        assert_eq!(resolved.strategy, KeyStrategy::ChannelTvgId);
    }

    #[test]
    fn test_entry_key_without_programs_does_not_fall_back_to_channel_tvg_id() {
        let mut ch = channel();
        ch.tvg_id = Some("channel.tvg".to_string());
        ch.epg_data_id = Some(7);

        let entries = index_epg_entries(vec![entry(7, Some("entry.tvg"))]);
        let index = build_index(vec![program("p", "channel.tvg", at(10, 0), 30)]);

        assert!(resolve_program_key(&ch, &entries, &index).is_none());
        assert!(resolve_channel_programs(&ch, &entries, &index, &window()).is_empty());
    }

    #[test]
    fn test_uuid_fallback_for_dummy_sources() {
        let uuid = Uuid::new_v4();
        let mut ch = channel();
        ch.tvg_id = Some("no.such.tvg".to_string());
        ch.uuid = Some(uuid);

        let index = build_index(vec![program("dummy", &uuid.to_string(), at(9, 30), 60)]);
        let resolved = resolve_program_key(&ch, &HashMap::new(), &index).unwrap();
        assert_eq!(resolved.strategy, KeyStrategy::ChannelUuid);

        let programs = resolve_channel_programs(&ch, &HashMap::new(), &index, &window());
        assert_eq!(programs.len(), 1);
    }

    #[test]
    fn test_uuid_only_channel() {
        let uuid = Uuid::new_v4();
        let mut ch = channel();
        ch.uuid = Some(uuid);

        let index = build_index(vec![program("dummy", &uuid.to_string(), at(9, 30), 60)]);
        assert_eq!(
            resolve_program_key(&ch, &HashMap::new(), &index).map(|r| r.strategy),
            Some(KeyStrategy::ChannelUuid)
        );
    }

    #[test]
    fn test_channel_without_any_key_is_empty() {
        let index = build_index(vec![program("p", "one.uk", at(10, 0), 30)]);
        assert!(resolve_channel_programs(&channel(), &HashMap::new(), &index, &window()).is_empty());
    }

    #[test]
    fn test_window_filter_uses_strict_overlap() {
        let mut ch = channel();
        ch.tvg_id = Some("one.uk".to_string());

        let index = build_index(vec![
            program("ends-at-start", "one.uk", at(8, 0), 60),
            program("straddles-start", "one.uk", at(8, 30), 60),
            program("inside", "one.uk", at(12, 0), 30),
            program("starts-at-end", "one.uk", at(15, 0), 30),
        ]);
        let ids: Vec<&str> = resolve_channel_programs(&ch, &HashMap::new(), &index, &window())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["straddles-start", "inside"]);
    }

    #[test]
    fn test_programs_outside_window_do_not_trigger_uuid_fallback() {
        let uuid = Uuid::new_v4();
        let mut ch = channel();
        ch.tvg_id = Some("one.uk".to_string());
        ch.uuid = Some(uuid);

        let index = build_index(vec![
            program("yesterday", "one.uk", at(1, 0), 60),
            program("dummy", &uuid.to_string(), at(10, 0), 60),
        ]);
        assert!(resolve_channel_programs(&ch, &HashMap::new(), &index, &window()).is_empty());
    }

    #[test]
    fn test_padded_channel_keys_match_ingested_programs() {
        let mut ch = channel();
        ch.tvg_id = Some(" one.uk ".to_string());
        let index = build_index(vec![program("a", "one.uk", at(10, 0), 30)]);

        let resolved = resolve_program_key(&ch, &HashMap::new(), &index).unwrap();
        assert_eq!(resolved.strategy, KeyStrategy::ChannelTvgId);
        assert_eq!(resolved.key, "one.uk");
        assert_eq!(resolve_channel_programs(&ch, &HashMap::new(), &index, &window()).len(), 1);

        ch.epg_data_id = Some(7);
        let entries = index_epg_entries(vec![entry(7, Some("\tone.uk\n"))]);
        assert_eq!(
            KeyStrategy::EpgDataTvgId.extract(&ch, &entries).as_deref(),
            Some("one.uk")
        );
        assert_eq!(KeyStrategy::ChannelTvgId.extract(&channel(), &entries), None);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(KeyStrategy::EpgDataTvgId.to_string(), "epg_data_tvg_id");
        assert_eq!(KeyStrategy::ChannelUuid.as_ref(), "channel_uuid");
    }
}
