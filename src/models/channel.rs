//! Channel ordering and filtering for guide rows

use std::cmp::Ordering;

use crate::models::Channel;

impl Channel {
    /// Guide row order: by display number, unnumbered channels last, then by name
    pub fn guide_order(&self, other: &Self) -> Ordering {
        match (self.channel_number, other.channel_number) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
    }

    /// Channel number as shown in the guide ("7", "5.1", or empty)
    pub fn display_number(&self) -> String {
        match self.channel_number {
            Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
            Some(n) => format!("{n}"),
            None => String::new(),
        }
    }
}

/// Sort channels into guide row order (stable)
pub fn sort_for_guide(channels: &mut [Channel]) {
    channels.sort_by(Channel::guide_order);
}

/// Row filter applied before virtualization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelFilter {
    /// Case-insensitive substring of the channel name
    pub search: Option<String>,
    /// Exact channel group name
    pub group: Option<String>,
}

impl ChannelFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(|s| s.trim().is_empty()) && self.group.is_none()
    }

    pub fn matches(&self, channel: &Channel) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
            && !channel
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }

        match &self.group {
            Some(group) => channel.channel_group.as_deref() == Some(group.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: i64, number: Option<f64>, name: &str, group: Option<&str>) -> Channel {
        Channel {
            id,
            channel_number: number,
            name: name.to_string(),
            tvg_id: None,
            uuid: None,
            epg_data_id: None,
            channel_group: group.map(str::to_string),
            logo_id: None,
        }
    }

    #[test]
    fn test_guide_order_numbers_then_unnumbered() {
        let mut channels = vec![
            channel(1, None, "Zeta", None),
            channel(2, Some(10.0), "Ten", None),
            channel(3, Some(2.5), "Two point five", None),
            channel(4, None, "alpha", None),
            channel(5, Some(2.0), "Two", None),
        ];
        sort_for_guide(&mut channels);
        let ids: Vec<i64> = channels.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 3, 2, 4, 1]);
    }

    #[test]
    fn test_display_number() {
        assert_eq!(channel(1, Some(7.0), "a", None).display_number(), "7");
        assert_eq!(channel(1, Some(5.1), "a", None).display_number(), "5.1");
        assert_eq!(channel(1, None, "a", None).display_number(), "");
    }

    #[test]
    fn test_filter() {
        let news = channel(1, Some(1.0), "BBC News", Some("UK"));
        let sport = channel(2, Some(2.0), "Sky Sports", Some("Sports"));

        let all = ChannelFilter::default();
        assert!(all.is_empty());
        assert!(all.matches(&news) && all.matches(&sport));

        let search = ChannelFilter {
            search: Some("news".to_string()),
            group: None,
        };
        assert!(search.matches(&news));
        assert!(!search.matches(&sport));

        let group = ChannelFilter {
            search: Some("  ".to_string()),
            group: Some("Sports".to_string()),
        };
        assert!(!group.is_empty());
        assert!(!group.matches(&news));
        assert!(group.matches(&sport));
    }
}
