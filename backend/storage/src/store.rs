//! Minimal object-store surface the pipeline needs.
//!
//! The backing APIs (Google Drive and the in-memory test store) expose
//! find-by-name-and-parent, create-with-parent, and whole-file content
//! read/replace. True partial appends are not part of the contract.

use anyhow::Result;
use async_trait::async_trait;

/// Opaque identifier of a folder in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderId(pub String);

/// Opaque identifier of a file in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(pub String);

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage backends implement this trait.
///
/// Name lookups are exact and case-sensitive, scoped to the immediate parent,
/// and must exclude trashed items. When duplicates exist (a race two callers
/// can lose), first-found order is canonical.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Find a child folder by exact name.
    async fn find_folder(&self, parent: &FolderId, name: &str) -> Result<Option<FolderId>>;

    /// Create a child folder. Does not check for an existing one.
    async fn create_folder(&self, parent: &FolderId, name: &str) -> Result<FolderId>;

    /// Find a child file by exact name.
    async fn find_file(&self, parent: &FolderId, name: &str) -> Result<Option<FileId>>;

    /// Create a file with initial content.
    async fn create_file(
        &self,
        parent: &FolderId,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<FileId>;

    /// Fetch the full current content of a file.
    async fn read_file(&self, file: &FileId) -> Result<Vec<u8>>;

    /// Replace the full content of a file.
    async fn update_file(&self, file: &FileId, content: Vec<u8>) -> Result<()>;
}
