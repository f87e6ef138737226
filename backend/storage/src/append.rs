//! Append engine for the consolidated daily logs.
//!
//! The backing stores only support whole-file content replace, so an append
//! is read → concatenate → overwrite. To keep that read-modify-write cycle
//! from losing entries when two events for the same partition and date land
//! in one batch, appends are serialized per (folder, file name) through an
//! in-process lock map; different keys proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, info};

use chatvault_core::VaultError;

use crate::store::{FileId, FolderId, ObjectStore};

const LOG_MIME: &str = "text/plain";

pub struct AppendEngine {
    store: Arc<dyn ObjectStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AppendEngine {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Append `entry_text` to `file_name` inside `folder`, creating the file
    /// with `header` + entry on first use.
    ///
    /// If the file exists but its content cannot be fetched, the append is
    /// aborted: starting over from empty would silently truncate history.
    pub async fn append_entry(
        &self,
        folder: &FolderId,
        file_name: &str,
        header: &str,
        entry_text: &str,
    ) -> Result<FileId, VaultError> {
        let lock = self.key_lock(folder, file_name).await;
        let _guard = lock.lock().await;

        let existing = self
            .store
            .find_file(folder, file_name)
            .await
            .map_err(|cause| VaultError::Upload {
                file_name: file_name.to_string(),
                cause,
            })?;

        match existing {
            Some(file) => {
                let mut content =
                    self.store
                        .read_file(&file)
                        .await
                        .map_err(|cause| VaultError::AppendRead {
                            file_name: file_name.to_string(),
                            cause,
                        })?;
                content.extend_from_slice(entry_text.as_bytes());
                self.store
                    .update_file(&file, content)
                    .await
                    .map_err(|cause| VaultError::Upload {
                        file_name: file_name.to_string(),
                        cause,
                    })?;
                debug!(file = file_name, id = %file, "Appended to existing log");
                Ok(file)
            }
            None => {
                let content = format!("{header}{entry_text}");
                let file = self
                    .store
                    .create_file(folder, file_name, LOG_MIME, content.into_bytes())
                    .await
                    .map_err(|cause| VaultError::Upload {
                        file_name: file_name.to_string(),
                        cause,
                    })?;
                info!(file = file_name, id = %file, "Created daily log");
                Ok(file)
            }
        }
    }

    async fn key_lock(&self, folder: &FolderId, file_name: &str) -> Arc<Mutex<()>> {
        let key = format!("{folder}/{file_name}");
        let mut locks = self.locks.lock().await;
        locks.entry(key).or_default().clone()
    }
}
