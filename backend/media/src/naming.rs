//! Deterministic names for stored binary attachments.

use chrono::{DateTime, Utc};

use chatvault_core::file_timestamp;

use crate::mime_infer::infer_extension;

/// Name for a stored attachment: `<JST timestamp>_<original name>`, or
/// `<JST timestamp>_file.<ext>` with the extension inferred from the content
/// type when the platform supplied no file name.
pub fn attachment_name(
    ts: DateTime<Utc>,
    original_name: Option<&str>,
    content_type: &str,
) -> String {
    let stamp = file_timestamp(ts);
    match original_name {
        Some(name) if !name.is_empty() => format!("{stamp}_{name}"),
        _ => format!("{stamp}_file.{}", infer_extension(content_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        // 22:13:20 UTC = 07:13:20 JST next day.
        Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
    }

    #[test]
    fn keeps_original_name_with_timestamp_prefix() {
        assert_eq!(
            attachment_name(ts(), Some("report.pdf"), "application/pdf"),
            "2023-11-15_07-13-20_report.pdf"
        );
    }

    #[test]
    fn infers_extension_when_name_missing() {
        assert_eq!(
            attachment_name(ts(), None, "audio/mp4"),
            "2023-11-15_07-13-20_file.m4a"
        );
        assert_eq!(
            attachment_name(ts(), None, "image/jpeg"),
            "2023-11-15_07-13-20_file.jpg"
        );
    }

    #[test]
    fn empty_name_counts_as_missing() {
        assert_eq!(
            attachment_name(ts(), Some(""), "video/mp4"),
            "2023-11-15_07-13-20_file.mp4"
        );
    }
}
