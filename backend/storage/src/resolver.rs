//! Idempotent folder-path resolution.
//!
//! Messages are organized as `<root>/<partition>/<YYYY-MM-DD>/…` where the
//! date is the JST calendar date of the event. Each segment is find-or-create:
//! we never hold a remote lock, so two overlapping calls can race and create
//! duplicate folders; first-found order stays canonical after that.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use chatvault_core::{date_segment, PartitionKey, VaultError};

use crate::store::{FolderId, ObjectStore};

/// Resolved (group, date) folder pair for one event.
#[derive(Debug, Clone)]
pub struct DatedPath {
    pub group: FolderId,
    pub date: FolderId,
    pub date_segment: String,
}

/// Finds or creates folder hierarchies under a fixed root.
#[derive(Clone)]
pub struct PathResolver {
    store: Arc<dyn ObjectStore>,
    root: FolderId,
}

impl PathResolver {
    pub fn new(store: Arc<dyn ObjectStore>, root: FolderId) -> Self {
        Self { store, root }
    }

    pub fn root(&self) -> &FolderId {
        &self.root
    }

    /// Descend through `segments` from the root, creating missing folders.
    /// Returns the leaf folder.
    pub async fn ensure_path(&self, segments: &[&str]) -> Result<FolderId, VaultError> {
        let mut current = self.root.clone();
        for segment in segments {
            current = self.ensure_child(&current, segment).await?;
        }
        Ok(current)
    }

    /// Resolve the `<partition>/<date>` pair for an event timestamp.
    pub async fn ensure_dated_path(
        &self,
        partition: &PartitionKey,
        ts: DateTime<Utc>,
    ) -> Result<DatedPath, VaultError> {
        let date = date_segment(ts);
        let group = self.ensure_child(&self.root, partition.as_str()).await?;
        let date_folder = self.ensure_child(&group, &date).await?;
        Ok(DatedPath {
            group,
            date: date_folder,
            date_segment: date,
        })
    }

    async fn ensure_child(&self, parent: &FolderId, name: &str) -> Result<FolderId, VaultError> {
        let found = self
            .store
            .find_folder(parent, name)
            .await
            .map_err(|cause| VaultError::ContainerResolution {
                name: name.to_string(),
                cause,
            })?;

        if let Some(id) = found {
            debug!(folder = name, id = %id, "Folder exists");
            return Ok(id);
        }

        let id = self
            .store
            .create_folder(parent, name)
            .await
            .map_err(|cause| VaultError::ContainerResolution {
                name: name.to_string(),
                cause,
            })?;
        debug!(folder = name, id = %id, "Folder created");
        Ok(id)
    }
}
