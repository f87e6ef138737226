//! LINE Messaging API client.
//!
//! Covers the three platform calls the pipeline needs: binary content
//! download, reply, and a best-effort profile lookup for sender display
//! names.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const REPLY_URL: &str = "https://api.line.me/v2/bot/message/reply";
const CONTENT_BASE: &str = "https://api-data.line.me/v2/bot/message";
const PROFILE_BASE: &str = "https://api.line.me/v2/bot/profile";

/// Bounded timeout for binary downloads; on expiry the event fails and is
/// not retried.
const CONTENT_TIMEOUT: Duration = Duration::from_secs(30);

/// The platform calls the archiver depends on, as a seam for tests.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Download the binary content of a message. Returns the bytes and the
    /// declared content type.
    async fn fetch_content(&self, message_id: &str) -> Result<(Vec<u8>, String)>;

    /// Display name for a user, if the platform knows one.
    async fn display_name(&self, user_id: &str) -> Result<String>;

    /// Send a text reply using a reply token.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

pub struct LineClient {
    access_token: String,
    http: Client,
}

#[derive(Deserialize)]
struct Profile {
    #[serde(rename = "displayName")]
    display_name: String,
}

impl LineClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl PlatformClient for LineClient {
    async fn fetch_content(&self, message_id: &str) -> Result<(Vec<u8>, String)> {
        debug!(message_id, "Downloading message content");
        let resp = self
            .http
            .get(format!("{CONTENT_BASE}/{message_id}/content"))
            .bearer_auth(&self.access_token)
            .timeout(CONTENT_TIMEOUT)
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("content download failed: HTTP {}", resp.status());
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok((bytes, content_type))
    }

    async fn display_name(&self, user_id: &str) -> Result<String> {
        let resp = self
            .http
            .get(format!("{PROFILE_BASE}/{user_id}"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("profile lookup failed: HTTP {}", resp.status());
        }
        let profile: Profile = resp.json().await?;
        Ok(profile.display_name)
    }

    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        self.http
            .post(REPLY_URL)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "replyToken": reply_token,
                "messages": [{ "type": "text", "text": text }]
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
