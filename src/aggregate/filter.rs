//! Client-side filtering of loaded records
//!
//! A record passes the [`FilterState`] when it matches the free-text search, falls
//! inside the date window, and belongs to the selected chain.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What the aggregator needs to know about a backend record
pub trait Record {
    /// When the record was created
    fn created_at(&self) -> DateTime<Utc>;

    /// Text fields matched by free-text search
    fn search_fields(&self) -> Vec<String>;

    /// Chain the record belongs to, if any
    fn chain_key(&self) -> Option<String> {
        None
    }
}

/// Date window applied to record timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    /// No date check
    AllTime,
    /// Created at or after `now - days`
    LastDays(u32),
    /// Created on a calendar day (UTC) between `start` and `end`, both inclusive
    Between { start: NaiveDate, end: NaiveDate },
}

impl Default for DateWindow {
    fn default() -> Self {
        DateWindow::LastDays(30)
    }
}

impl DateWindow {
    /// Quick ranges offered by the dashboard, in cycling order
    pub const PRESETS: [DateWindow; 5] = [
        DateWindow::LastDays(7),
        DateWindow::LastDays(30),
        DateWindow::LastDays(90),
        DateWindow::LastDays(365),
        DateWindow::AllTime,
    ];

    /// Parses `7`, `30`, `90`, `365` style day counts or `all`
    pub fn parse(s: &str) -> Option<DateWindow> {
        let s = s.trim().to_lowercase();
        if s == "all" || s == "all-time" {
            return Some(DateWindow::AllTime);
        }
        s.trim_end_matches('d')
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .map(DateWindow::LastDays)
    }

    /// Whether `at` falls inside the window as of `now`
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            DateWindow::AllTime => true,
            DateWindow::LastDays(days) => at >= now - Duration::days(i64::from(days)),
            DateWindow::Between { start, end } => {
                let day = at.date_naive();
                day >= start && day <= end
            }
        }
    }

    /// Next preset after this one, wrapping around
    pub fn next_preset(&self) -> DateWindow {
        let idx = Self::PRESETS.iter().position(|w| w == self);
        match idx {
            Some(i) => Self::PRESETS[(i + 1) % Self::PRESETS.len()],
            None => Self::PRESETS[0],
        }
    }

    pub fn label(&self) -> String {
        match self {
            DateWindow::AllTime => "All time".to_string(),
            DateWindow::LastDays(365) => "Last year".to_string(),
            DateWindow::LastDays(days) => format!("Last {} days", days),
            DateWindow::Between { start, end } => format!("{} to {}", start, end),
        }
    }
}

/// Current client-side filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text search, matched case-insensitively
    pub search: String,
    pub window: DateWindow,
    /// Only keep records on this chain
    pub chain: Option<String>,
}

impl FilterState {
    /// Whether `record` passes every active filter
    pub fn matches<R: Record>(&self, record: &R, now: DateTime<Utc>) -> bool {
        self.matches_search(record)
            && self.window.contains(record.created_at(), now)
            && self.matches_chain(record)
    }

    fn matches_search<R: Record>(&self, record: &R) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_chain<R: Record>(&self, record: &R) -> bool {
        match self.chain.as_deref() {
            None | Some("all") => true,
            Some(chain) => record.chain_key().as_deref() == Some(chain),
        }
    }

    /// Records passing the filters, in their original order
    pub fn apply<'a, R: Record>(&self, records: &'a [R], now: DateTime<Utc>) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(*r, now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row {
        at: DateTime<Utc>,
        address: &'static str,
        chain: &'static str,
    }

    impl Record for Row {
        fn created_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn search_fields(&self) -> Vec<String> {
            vec![self.address.to_string()]
        }

        fn chain_key(&self) -> Option<String> {
            Some(self.chain.to_string())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn row(days_ago: i64, address: &'static str, chain: &'static str) -> Row {
        Row {
            at: now() - Duration::days(days_ago),
            address,
            chain,
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filters = FilterState {
            search: "ABCD".to_string(),
            window: DateWindow::AllTime,
            chain: None,
        };

        assert!(filters.matches(&row(1, "0x12abcdef", "8453"), now()));
        assert!(!filters.matches(&row(1, "0x1234", "8453"), now()));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let filters = FilterState {
            window: DateWindow::AllTime,
            ..Default::default()
        };
        assert!(filters.matches(&row(1000, "anything", "1"), now()));
    }

    #[test]
    fn test_last_days_window_is_inclusive_at_cutoff() {
        let window = DateWindow::LastDays(30);
        let cutoff = now() - Duration::days(30);

        assert!(window.contains(cutoff, now()));
        assert!(!window.contains(cutoff - Duration::milliseconds(1), now()));
    }

    #[test]
    fn test_between_window_includes_both_end_days() {
        let window = DateWindow::Between {
            start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        };

        let first = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2025, 6, 10, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();

        assert!(window.contains(first, now()));
        assert!(window.contains(last, now()));
        assert!(!window.contains(after, now()));
    }

    #[test]
    fn test_all_time_disables_date_check() {
        assert!(DateWindow::AllTime.contains(Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap(), now()));
    }

    #[test]
    fn test_chain_filter() {
        let filters = FilterState {
            window: DateWindow::AllTime,
            chain: Some("137".to_string()),
            ..Default::default()
        };

        assert!(filters.matches(&row(1, "a", "137"), now()));
        assert!(!filters.matches(&row(1, "a", "8453"), now()));
    }

    #[test]
    fn test_apply_keeps_order_and_combines_filters() {
        let rows = vec![
            row(1, "0xaaa", "1"),
            row(40, "0xaab", "1"),
            row(2, "0xccc", "1"),
            row(3, "0xaac", "1"),
        ];
        let filters = FilterState {
            search: "0xaa".to_string(),
            window: DateWindow::LastDays(30),
            chain: None,
        };

        let kept: Vec<&str> = filters.apply(&rows, now()).iter().map(|r| r.address).collect();

        assert_eq!(kept, vec!["0xaaa", "0xaac"]);
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(DateWindow::parse("7"), Some(DateWindow::LastDays(7)));
        assert_eq!(DateWindow::parse("90d"), Some(DateWindow::LastDays(90)));
        assert_eq!(DateWindow::parse("ALL"), Some(DateWindow::AllTime));
        assert_eq!(DateWindow::parse("0"), None);
        assert_eq!(DateWindow::parse("soon"), None);
    }

    #[test]
    fn test_next_preset_cycles() {
        assert_eq!(DateWindow::LastDays(7).next_preset(), DateWindow::LastDays(30));
        assert_eq!(DateWindow::AllTime.next_preset(), DateWindow::LastDays(7));
        assert_eq!(DateWindow::LastDays(12).next_preset(), DateWindow::LastDays(7));
    }

    #[test]
    fn test_labels() {
        assert_eq!(DateWindow::LastDays(365).label(), "Last year");
        assert_eq!(DateWindow::LastDays(30).label(), "Last 30 days");
        assert_eq!(DateWindow::AllTime.label(), "All time");
    }
}
