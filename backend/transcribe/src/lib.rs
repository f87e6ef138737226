//! Speech-to-text side path.
//!
//! Voice notes are transcribed with OpenAI Whisper, cleaned of filler words,
//! optionally summarized, and the result is replied to the chat user. This is
//! the only path that reports failures back to the user directly.

pub mod cleanup;
pub mod reply;
pub mod whisper;

pub use cleanup::clean_transcript;
pub use reply::{format_error_reply, format_transcription_reply};
pub use whisper::{Transcriber, TranscriberConfig, Transcription};
