//! Bounded, time-bucketed cache of past generation results.

mod store;

pub use store::{Clock, HistoryStore, MAX_HISTORY, SystemClock};

use chrono::{Local, LocalResult, TimeZone};
use serde::{Deserialize, Serialize};

pub const MS_PER_DAY: i64 = 86_400_000;

/// One stored past generation result.
///
/// The serialized field names (`id`, `url`, `email`, `timestamp`) are the
/// durable snapshot format; keep them stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, monotonically increasing, time-derived id.
    pub id: i64,
    /// The submitted URL, unvalidated beyond non-empty.
    #[serde(rename = "url")]
    pub source_url: String,
    /// Full email body returned by the generation service.
    #[serde(rename = "email")]
    pub generated_text: String,
    /// Milliseconds since epoch at insertion.
    #[serde(rename = "timestamp")]
    pub created_at: i64,
}

/// History partitioned into calendar-recency groups for display.
///
/// Buckets are disjoint, cover the full collection, and each preserves the
/// store's descending-recency order.
#[derive(Debug, Clone, Default)]
pub struct RecencyBuckets {
    pub today: Vec<HistoryEntry>,
    pub yesterday: Vec<HistoryEntry>,
    pub last_7_days: Vec<HistoryEntry>,
    pub older: Vec<HistoryEntry>,
}

impl RecencyBuckets {
    /// Total entries across all buckets.
    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.last_7_days.len() + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Local-calendar midnight of the day containing `now_ms`, in epoch ms.
///
/// Bucket boundaries follow the local calendar day. DST edge cases where
/// local midnight does not exist resolve to the earliest valid instant.
pub fn start_of_today_ms(now_ms: i64) -> i64 {
    let LocalResult::Single(now) = Local.timestamp_millis_opt(now_ms) else {
        return now_ms;
    };
    let Some(midnight) = now.date_naive().and_hms_opt(0, 0, 0) else {
        return now_ms;
    };
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => now_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_form_uses_snapshot_field_names() {
        let entry = HistoryEntry {
            id: 1700000000001,
            source_url: "https://a.com".into(),
            generated_text: "Hi A".into(),
            created_at: 1700000000000,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"id":1700000000001,"url":"https://a.com","email":"Hi A","timestamp":1700000000000}"#
        );

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn start_of_today_is_at_most_now_and_within_a_day() {
        let now = 1_756_200_000_000; // an arbitrary modern instant
        let day_start = start_of_today_ms(now);
        assert!(day_start <= now);
        assert!(now - day_start < MS_PER_DAY);
    }

    #[test]
    fn start_of_today_is_idempotent() {
        let now = 1_756_200_000_000;
        let day_start = start_of_today_ms(now);
        assert_eq!(start_of_today_ms(day_start), day_start);
    }
}
