//! Wire types for the LINE webhook payload.

use serde::Deserialize;

/// Top-level webhook body: `{ "events": [ … ] }`.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<InboundEvent>,
}

#[derive(Debug, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: Option<EventSource>,
    /// Epoch millis, UTC.
    pub timestamp: i64,
    pub message: Option<InboundMessage>,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
}
