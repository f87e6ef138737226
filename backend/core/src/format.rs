//! Canonical log-line and naming scheme for stored messages.
//!
//! All dates and timestamps are rendered in JST (UTC+9); the shifted calendar
//! date, not the server's local date, is the partition boundary.

use chrono::{DateTime, FixedOffset, Utc};

use crate::types::{Entry, PartitionKey};

/// Fixed UTC+9 offset used for all user-facing timestamps and date folders.
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

fn to_jst(ts: DateTime<Utc>) -> DateTime<FixedOffset> {
    // Offset is a compile-time constant, always valid.
    ts.with_timezone(&FixedOffset::east_opt(JST_OFFSET_SECS).unwrap())
}

/// Date folder name (`YYYY-MM-DD`) for an event timestamp.
pub fn date_segment(ts: DateTime<Utc>) -> String {
    to_jst(ts).format("%Y-%m-%d").to_string()
}

/// Entry timestamp rendered as `YYYY-MM-DD HH:MM:SS` in JST.
pub fn entry_timestamp(ts: DateTime<Utc>) -> String {
    to_jst(ts).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Compact JST timestamp safe for file names (`YYYY-MM-DD_HH-MM-SS`).
pub fn file_timestamp(ts: DateTime<Utc>) -> String {
    to_jst(ts).format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Name of the consolidated per-day log inside a date folder.
pub fn daily_log_name(date_segment: &str) -> String {
    format!("messages_{date_segment}.txt")
}

/// Header block written once when a daily log is first created.
pub fn log_header(partition: &PartitionKey, created: DateTime<Utc>) -> String {
    format!(
        "=== chatvault message log ===\npartition: {}\ncreated: {}\n\n",
        partition,
        entry_timestamp(created),
    )
}

/// Render one entry as it appears in the daily log.
pub fn render_entry(entry: &Entry) -> String {
    format!(
        "[{}] {}\n{}\n\n",
        entry_timestamp(entry.timestamp),
        entry.sender,
        entry.body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceInfo, SourceKind};
    use chrono::TimeZone;

    #[test]
    fn date_segment_shifts_into_next_jst_day() {
        // 15:30 UTC is 00:30 JST the following day.
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 15, 30, 0).unwrap();
        assert_eq!(date_segment(ts), "2024-01-02");
    }

    #[test]
    fn date_segment_keeps_same_day_before_boundary() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 14, 59, 59).unwrap();
        assert_eq!(date_segment(ts), "2024-01-01");
    }

    #[test]
    fn entry_renders_timestamp_sender_and_body() {
        let entry = Entry {
            timestamp: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
            sender: "U123".into(),
            body: "hello".into(),
        };
        assert_eq!(render_entry(&entry), "[2023-11-15 07:13:20] U123\nhello\n\n");
    }

    #[test]
    fn header_names_the_partition() {
        let source = SourceInfo {
            kind: SourceKind::Group,
            user_id: Some("U1".into()),
            group_id: Some("C1".into()),
            room_id: None,
        };
        let key = PartitionKey::from_source(&source);
        let header = log_header(&key, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert!(header.contains(&format!("partition: {key}")));
        assert!(header.ends_with("\n\n"));
    }

    #[test]
    fn daily_log_name_is_date_scoped() {
        assert_eq!(daily_log_name("2024-01-02"), "messages_2024-01-02.txt");
    }
}
