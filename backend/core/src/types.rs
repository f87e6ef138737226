use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where a message came from, as reported by the chat platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    User,
    Group,
    Room,
}

/// Normalized message origin, derived once per inbound event.
///
/// Exactly one of `group_id`/`room_id` is set when `kind` is Group/Room;
/// both are `None` for a one-on-one chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceInfo {
    pub kind: SourceKind,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl SourceInfo {
    /// The id that identifies the storage partition (group id, room id, or
    /// sender user id in that order of precedence).
    pub fn partition_id(&self) -> Option<&str> {
        match self.kind {
            SourceKind::Group => self.group_id.as_deref(),
            SourceKind::Room => self.room_id.as_deref(),
            SourceKind::User => self.user_id.as_deref(),
        }
    }

    /// Display name to fall back to when no profile lookup is available.
    pub fn sender_fallback(&self) -> &str {
        self.user_id.as_deref().unwrap_or("unknown")
    }
}

/// Stable folder name for a message partition.
///
/// The upstream system truncated raw platform ids to their first 8 chars,
/// which can collide across distinct ids. We derive the short form from a
/// SHA-256 of the full id instead, keeping the folder name compact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn from_source(source: &SourceInfo) -> Self {
        let prefix = match source.kind {
            SourceKind::Group => "group",
            SourceKind::Room => "room",
            SourceKind::User => "user",
        };
        match source.partition_id() {
            Some(id) => {
                let digest = Sha256::digest(id.as_bytes());
                Self(format!("{}_{}", prefix, &hex::encode(digest)[..8]))
            }
            None => Self(format!("{prefix}_unknown")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single log line appended to a daily log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Event time as reported by the platform (UTC epoch millis upstream).
    pub timestamp: DateTime<Utc>,
    /// Sender display name, or the raw user id when no profile is known.
    pub sender: String,
    /// Message body text.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_source(group_id: &str) -> SourceInfo {
        SourceInfo {
            kind: SourceKind::Group,
            user_id: Some("U123".into()),
            group_id: Some(group_id.into()),
            room_id: None,
        }
    }

    #[test]
    fn partition_key_is_stable() {
        let a = PartitionKey::from_source(&group_source("Cabc123"));
        let b = PartitionKey::from_source(&group_source("Cabc123"));
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("group_"));
        assert_eq!(a.as_str().len(), "group_".len() + 8);
    }

    #[test]
    fn distinct_ids_with_shared_prefix_do_not_collide() {
        // Raw 8-char truncation would make these identical.
        let a = PartitionKey::from_source(&group_source("Cabcdef0-one"));
        let b = PartitionKey::from_source(&group_source("Cabcdef0-two"));
        assert_ne!(a, b);
    }

    #[test]
    fn missing_user_id_falls_back_to_unknown() {
        let source = SourceInfo {
            kind: SourceKind::User,
            user_id: None,
            group_id: None,
            room_id: None,
        };
        assert_eq!(PartitionKey::from_source(&source).as_str(), "user_unknown");
        assert_eq!(source.sender_fallback(), "unknown");
    }
}
