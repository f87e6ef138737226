//! Per-event archiving pipeline.
//!
//! One archiver instance serves every partition: classification decides the
//! partition key, the resolver materializes `<partition>/<date>/`, and the
//! append engine or a direct upload lands the content. Every failure is
//! converted to a `VaultError` at this boundary; sibling events in a batch
//! are unaffected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use chatvault_core::{
    daily_log_name, log_header, render_entry, Entry, PartitionKey, SourceInfo, VaultError,
};
use chatvault_storage::{AppendEngine, FileId, ObjectStore, PathResolver};
use chatvault_transcribe::{format_error_reply, format_transcription_reply, Transcriber};
use media::{attachment_name, default_mime_for_kind};

use crate::classify::classify;
use crate::line::PlatformClient;
use crate::wire::InboundEvent;

/// What happened to a single event.
#[derive(Debug)]
pub enum Outcome {
    /// Text entry appended to the daily log.
    Logged { file: FileId },
    /// Binary attachment uploaded.
    Uploaded { file: FileId, name: String },
    Joined,
    Left,
    Skipped { reason: String },
}

pub struct Archiver {
    store: Arc<dyn ObjectStore>,
    resolver: PathResolver,
    engine: AppendEngine,
    platform: Option<Arc<dyn PlatformClient>>,
    transcriber: Option<Arc<Transcriber>>,
}

impl Archiver {
    pub fn new(store: Arc<dyn ObjectStore>, resolver: PathResolver) -> Self {
        let engine = AppendEngine::new(store.clone());
        Self {
            store,
            resolver,
            engine,
            platform: None,
            transcriber: None,
        }
    }

    pub fn with_platform(mut self, platform: Arc<dyn PlatformClient>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Process one webhook event. Errors here abort only this event.
    pub async fn process_event(&self, event: &InboundEvent) -> Result<Outcome, VaultError> {
        match event.kind.as_str() {
            "message" => self.process_message(event).await,
            "join" => {
                info!(source = ?event.source, "Bot joined a group/room");
                Ok(Outcome::Joined)
            }
            "leave" => {
                info!(source = ?event.source, "Bot left a group/room");
                Ok(Outcome::Left)
            }
            other => Ok(Outcome::Skipped {
                reason: format!("unhandled event type '{other}'"),
            }),
        }
    }

    async fn process_message(&self, event: &InboundEvent) -> Result<Outcome, VaultError> {
        let Some(message) = &event.message else {
            return Ok(Outcome::Skipped {
                reason: "message event without message body".into(),
            });
        };

        let source = classify(event.source.as_ref());
        let partition = PartitionKey::from_source(&source);
        let ts = event_time(event.timestamp);

        match message.kind.as_str() {
            "text" => {
                let text = message.text.clone().unwrap_or_default();
                self.archive_text(&source, &partition, ts, text).await
            }
            "image" | "video" | "audio" | "file" => {
                let Some(message_id) = message.id.as_deref() else {
                    return Ok(Outcome::Skipped {
                        reason: "binary message without content id".into(),
                    });
                };
                self.archive_binary(
                    &source,
                    &partition,
                    ts,
                    &message.kind,
                    message_id,
                    message.file_name.as_deref(),
                    event.reply_token.as_deref(),
                )
                .await
            }
            other => Ok(Outcome::Skipped {
                reason: format!("unsupported message type '{other}'"),
            }),
        }
    }

    async fn archive_text(
        &self,
        source: &SourceInfo,
        partition: &PartitionKey,
        ts: DateTime<Utc>,
        body: String,
    ) -> Result<Outcome, VaultError> {
        let path = self.resolver.ensure_dated_path(partition, ts).await?;
        let entry = Entry {
            timestamp: ts,
            sender: self.sender_display(source).await,
            body,
        };
        let file = self
            .engine
            .append_entry(
                &path.date,
                &daily_log_name(&path.date_segment),
                &log_header(partition, ts),
                &render_entry(&entry),
            )
            .await?;
        debug!(partition = %partition, date = %path.date_segment, "Text entry archived");
        Ok(Outcome::Logged { file })
    }

    #[allow(clippy::too_many_arguments)]
    async fn archive_binary(
        &self,
        source: &SourceInfo,
        partition: &PartitionKey,
        ts: DateTime<Utc>,
        kind: &str,
        message_id: &str,
        file_name: Option<&str>,
        reply_token: Option<&str>,
    ) -> Result<Outcome, VaultError> {
        let Some(platform) = &self.platform else {
            return Err(VaultError::Upload {
                file_name: file_name.unwrap_or(message_id).to_string(),
                cause: anyhow::anyhow!("no platform client configured for binary content"),
            });
        };

        let (bytes, declared_type) =
            platform
                .fetch_content(message_id)
                .await
                .map_err(|cause| VaultError::Upload {
                    file_name: file_name.unwrap_or(message_id).to_string(),
                    cause,
                })?;
        let content_type = if declared_type == "application/octet-stream" {
            default_mime_for_kind(kind).to_string()
        } else {
            declared_type
        };

        let path = self.resolver.ensure_dated_path(partition, ts).await?;
        let name = attachment_name(ts, file_name, &content_type);
        let file = self
            .store
            .create_file(&path.date, &name, &content_type, bytes.clone())
            .await
            .map_err(|cause| VaultError::Upload {
                file_name: name.clone(),
                cause,
            })?;
        info!(partition = %partition, file = %name, "Attachment archived");

        // The daily log records that a binary landed, so the text history
        // stays a complete timeline. Best effort.
        let placeholder = Entry {
            timestamp: ts,
            sender: self.sender_display(source).await,
            body: format!("[{kind} stored: {name}]"),
        };
        if let Err(err) = self
            .engine
            .append_entry(
                &path.date,
                &daily_log_name(&path.date_segment),
                &log_header(partition, ts),
                &render_entry(&placeholder),
            )
            .await
        {
            warn!("Could not record attachment in daily log: {err}");
        }

        if kind == "audio" {
            self.transcribe_and_reply(bytes, &content_type, reply_token)
                .await;
        }

        Ok(Outcome::Uploaded { file, name })
    }

    /// Voice side path: transcription failures are replied to the user, never
    /// escalated; the attachment itself is already stored.
    async fn transcribe_and_reply(
        &self,
        audio: Vec<u8>,
        content_type: &str,
        reply_token: Option<&str>,
    ) {
        let (Some(transcriber), Some(platform), Some(token)) =
            (&self.transcriber, &self.platform, reply_token)
        else {
            return;
        };

        let reply_text = match transcriber.transcribe(audio, content_type).await {
            Ok(result) => format_transcription_reply(&result),
            Err(err) => {
                warn!("Transcription failed: {err}");
                format_error_reply(&err.to_string())
            }
        };
        if let Err(err) = platform.reply(token, &reply_text).await {
            warn!("Could not send transcription reply: {err}");
        }
    }

    async fn sender_display(&self, source: &SourceInfo) -> String {
        if let (Some(platform), Some(user_id)) = (&self.platform, source.user_id.as_deref()) {
            match platform.display_name(user_id).await {
                Ok(name) => return name,
                Err(err) => debug!(user_id, "Profile lookup failed: {err}"),
            }
        }
        source.sender_fallback().to_string()
    }
}

fn event_time(epoch_millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_millis).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{EventSource, InboundMessage};
    use anyhow::Result;
    use async_trait::async_trait;
    use chatvault_storage::{FolderId, MemoryStore};
    use std::sync::Mutex;

    fn archiver() -> (Arc<MemoryStore>, Archiver) {
        let store = Arc::new(MemoryStore::new());
        let root = store.root();
        let resolver = PathResolver::new(store.clone(), root);
        let archiver = Archiver::new(store.clone(), resolver);
        (store, archiver)
    }

    fn text_event(ts: i64, user: &str, text: &str) -> InboundEvent {
        InboundEvent {
            kind: "message".into(),
            source: Some(EventSource {
                kind: Some("group".into()),
                user_id: Some(user.into()),
                group_id: Some("Cgroup1".into()),
                room_id: None,
            }),
            timestamp: ts,
            message: Some(InboundMessage {
                kind: "text".into(),
                id: Some("m1".into()),
                text: Some(text.into()),
                file_name: None,
            }),
            reply_token: None,
        }
    }

    async fn log_content(store: &MemoryStore, file: &FileId) -> String {
        String::from_utf8(store.read_file(file).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn two_same_day_text_events_share_one_log() {
        let (store, archiver) = archiver();

        // 1700000000000 = 2023-11-14T22:13:20Z = 2023-11-15 07:13:20 JST.
        let first = archiver
            .process_event(&text_event(1_700_000_000_000, "U123", "hello"))
            .await
            .unwrap();
        let Outcome::Logged { file } = first else {
            panic!("expected Logged, got {first:?}")
        };
        let after_first = log_content(&store, &file).await;
        assert!(after_first.contains("[2023-11-15 07:13:20] U123\nhello\n"));

        // Five minutes later, same sender, same JST day.
        let second = archiver
            .process_event(&text_event(1_700_000_300_000, "U123", "again"))
            .await
            .unwrap();
        let Outcome::Logged { file: file2 } = second else {
            panic!("expected Logged, got {second:?}")
        };
        assert_eq!(file, file2);

        let after_second = log_content(&store, &file).await;
        // First entry's bytes unchanged, second appended after it.
        assert!(after_second.starts_with(&after_first));
        assert!(after_second.contains("[2023-11-15 07:18:20] U123\nagain\n"));

        // Exactly one group folder, one date folder, one file.
        assert_eq!(store.folder_count(), 2);
        assert_eq!(store.file_count(), 1);
        let groups = store.child_folder_names(&store.root());
        assert_eq!(groups.len(), 1);
        assert!(groups[0].starts_with("group_"));
    }

    #[tokio::test]
    async fn different_partitions_use_different_folders() {
        let (store, archiver) = archiver();
        let mut room_event = text_event(1_700_000_000_000, "U9", "hi");
        room_event.source = Some(EventSource {
            kind: Some("room".into()),
            user_id: Some("U9".into()),
            group_id: None,
            room_id: Some("Rroom1".into()),
        });

        archiver
            .process_event(&text_event(1_700_000_000_000, "U1", "a"))
            .await
            .unwrap();
        archiver.process_event(&room_event).await.unwrap();

        let groups = store.child_folder_names(&store.root());
        assert_eq!(groups.len(), 2);
        assert_eq!(store.file_count(), 2);
    }

    #[tokio::test]
    async fn join_and_unknown_events_do_not_touch_storage() {
        let (store, archiver) = archiver();
        let mut join = text_event(1_700_000_000_000, "U1", "");
        join.kind = "join".into();
        join.message = None;
        assert!(matches!(
            archiver.process_event(&join).await.unwrap(),
            Outcome::Joined
        ));

        let mut sticker = text_event(1_700_000_000_000, "U1", "");
        sticker.message = Some(InboundMessage {
            kind: "sticker".into(),
            id: Some("m2".into()),
            text: None,
            file_name: None,
        });
        assert!(matches!(
            archiver.process_event(&sticker).await.unwrap(),
            Outcome::Skipped { .. }
        ));

        assert_eq!(store.folder_count(), 0);
        assert_eq!(store.file_count(), 0);
    }

    struct StubPlatform {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PlatformClient for StubPlatform {
        async fn fetch_content(&self, _message_id: &str) -> Result<(Vec<u8>, String)> {
            Ok((vec![0xFF, 0xD8, 0xFF], "image/jpeg".into()))
        }
        async fn display_name(&self, _user_id: &str) -> Result<String> {
            Ok("Alice".into())
        }
        async fn reply(&self, _reply_token: &str, text: &str) -> Result<()> {
            self.replies.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn binary_message_is_uploaded_and_logged() {
        let (store, archiver) = archiver();
        let archiver = archiver.with_platform(Arc::new(StubPlatform {
            replies: Mutex::new(Vec::new()),
        }));

        let mut event = text_event(1_700_000_000_000, "U1", "");
        event.message = Some(InboundMessage {
            kind: "image".into(),
            id: Some("m42".into()),
            text: None,
            file_name: None,
        });

        let outcome = archiver.process_event(&event).await.unwrap();
        let Outcome::Uploaded { file, name } = outcome else {
            panic!("expected Uploaded")
        };
        assert_eq!(name, "2023-11-15_07-13-20_file.jpg");
        assert_eq!(store.read_file(&file).await.unwrap(), vec![0xFF, 0xD8, 0xFF]);

        // Attachment plus the daily log recording it, from "Alice".
        assert_eq!(store.file_count(), 2);
        let date_folder = {
            let group = store
                .find_folder(&store.root(), &PartitionKey::from_source(&classify(event.source.as_ref())).to_string())
                .await
                .unwrap()
                .unwrap();
            store.find_folder(&group, "2023-11-15").await.unwrap().unwrap()
        };
        let log = store
            .find_file(&date_folder, "messages_2023-11-15.txt")
            .await
            .unwrap()
            .unwrap();
        let content = log_content(&store, &log).await;
        assert!(content.contains("Alice"));
        assert!(content.contains("[image stored: 2023-11-15_07-13-20_file.jpg]"));
    }

    #[tokio::test]
    async fn binary_without_platform_client_fails_event() {
        let (store, archiver) = archiver();
        let mut event = text_event(1_700_000_000_000, "U1", "");
        event.message = Some(InboundMessage {
            kind: "file".into(),
            id: Some("m7".into()),
            text: None,
            file_name: Some("doc.pdf".into()),
        });
        let err = archiver.process_event(&event).await.unwrap_err();
        assert!(matches!(err, VaultError::Upload { .. }), "{err}");
        assert_eq!(store.file_count(), 0);
    }
}
