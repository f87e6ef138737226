//! OpenAI Whisper transcription client.

use anyhow::{bail, Result};
use reqwest::Client;
use tracing::info;

use crate::cleanup::clean_transcript;

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Clone)]
pub struct TranscriberConfig {
    pub api_key: String,
    /// Whisper model name.
    pub model: String,
    /// Chat model used for optional summaries.
    pub summary_model: String,
    /// Transcripts at or above this length (chars) get a summary.
    pub summary_threshold: usize,
    /// BCP-47 hint passed to Whisper.
    pub language: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "whisper-1".into(),
            summary_model: "gpt-4o-mini".into(),
            summary_threshold: 200,
            language: "ja".into(),
        }
    }
}

/// Result of one voice-note transcription.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub summary: Option<String>,
}

pub struct Transcriber {
    config: TranscriberConfig,
    http: Client,
}

impl Transcriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Transcribe audio bytes, clean the transcript, and summarize long ones.
    ///
    /// Summary failures are swallowed: the transcript is the deliverable, the
    /// summary an extra.
    pub async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> Result<Transcription> {
        let raw = self.call_whisper(audio, mime_type).await?;
        let text = clean_transcript(&raw);

        let summary = if text.chars().count() >= self.config.summary_threshold {
            match self.summarize(&text).await {
                Ok(s) => Some(s),
                Err(err) => {
                    info!("Summary generation failed, returning transcript only: {err}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Transcription { text, summary })
    }

    async fn call_whisper(&self, audio: Vec<u8>, mime_type: &str) -> Result<String> {
        info!("Transcribing voice note via Whisper ({} bytes)", audio.len());
        let ext = if mime_type.contains("mp3") { "mp3" } else { "m4a" };
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(format!("audio.{ext}"))
            .mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone())
            .text("response_format", "json")
            .part("file", part);

        let resp = self
            .http
            .post(TRANSCRIPTION_URL)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("Whisper error: {}", resp.text().await.unwrap_or_default());
        }
        let json: serde_json::Value = resp.json().await?;
        Ok(json["text"].as_str().unwrap_or("").to_string())
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let resp = self
            .http
            .post(CHAT_URL)
            .bearer_auth(&self.config.api_key)
            .json(&serde_json::json!({
                "model": self.config.summary_model,
                "messages": [
                    {
                        "role": "system",
                        "content": "Summarize the following transcript in at most three short bullet points, in its original language."
                    },
                    { "role": "user", "content": text }
                ],
                "max_tokens": 200,
                "temperature": 0.3,
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("summary error: {}", resp.text().await.unwrap_or_default());
        }
        let json: serde_json::Value = resp.json().await?;
        match json["choices"][0]["message"]["content"].as_str() {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => bail!("summary response had no content"),
        }
    }
}
