//! Reply text sent back to the chat user for the voice path.

use crate::whisper::Transcription;

/// Format a successful transcription for the reply message.
pub fn format_transcription_reply(result: &Transcription) -> String {
    let mut message = format!("📝 Transcript\n\n{}", result.text);
    if let Some(summary) = &result.summary {
        message.push_str("\n\n📌 Summary\n");
        message.push_str(summary);
    }
    message
}

/// User-facing error reply when the voice path fails.
pub fn format_error_reply(reason: &str) -> String {
    format!("⚠️ Could not transcribe this voice message: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_includes_summary_when_present() {
        let with = Transcription {
            text: "long text".into(),
            summary: Some("short".into()),
        };
        let reply = format_transcription_reply(&with);
        assert!(reply.contains("long text"));
        assert!(reply.contains("Summary"));
        assert!(reply.contains("short"));
    }

    #[test]
    fn reply_omits_summary_section_when_absent() {
        let without = Transcription {
            text: "hi".into(),
            summary: None,
        };
        assert!(!format_transcription_reply(&without).contains("Summary"));
    }

    #[test]
    fn error_reply_names_the_reason() {
        assert!(format_error_reply("upstream timeout").contains("upstream timeout"));
    }
}
