//! In-memory object store.
//!
//! Backend used by the test suite and for local development without Drive
//! credentials. Mirrors the remote semantics: exact-name lookups scoped to a
//! parent, whole-file content replace, no partial appends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::store::{FileId, FolderId, ObjectStore};

#[derive(Debug, Clone)]
struct FolderNode {
    parent: FolderId,
    name: String,
}

#[derive(Debug, Clone)]
struct FileNode {
    parent: FolderId,
    name: String,
    #[allow(dead_code)]
    mime_type: String,
    content: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    folders: HashMap<String, FolderNode>,
    files: HashMap<String, FileNode>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Root folder every store starts with.
    pub fn root(&self) -> FolderId {
        FolderId("root".into())
    }

    pub fn folder_count(&self) -> usize {
        self.inner.lock().unwrap().folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.inner.lock().unwrap().files.len()
    }

    /// Names of the direct child folders of `parent`, for assertions.
    pub fn child_folder_names(&self, parent: &FolderId) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner
            .folders
            .values()
            .filter(|f| &f.parent == parent)
            .map(|f| f.name.clone())
            .collect();
        names.sort();
        names
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn find_folder(&self, parent: &FolderId, name: &str) -> Result<Option<FolderId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .folders
            .iter()
            .find(|(_, f)| &f.parent == parent && f.name == name)
            .map(|(id, _)| FolderId(id.clone())))
    }

    async fn create_folder(&self, parent: &FolderId, name: &str) -> Result<FolderId> {
        let id = self.fresh_id("folder");
        let mut inner = self.inner.lock().unwrap();
        inner.folders.insert(
            id.clone(),
            FolderNode {
                parent: parent.clone(),
                name: name.to_string(),
            },
        );
        Ok(FolderId(id))
    }

    async fn find_file(&self, parent: &FolderId, name: &str) -> Result<Option<FileId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .files
            .iter()
            .find(|(_, f)| &f.parent == parent && f.name == name)
            .map(|(id, _)| FileId(id.clone())))
    }

    async fn create_file(
        &self,
        parent: &FolderId,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<FileId> {
        let id = self.fresh_id("file");
        let mut inner = self.inner.lock().unwrap();
        inner.files.insert(
            id.clone(),
            FileNode {
                parent: parent.clone(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                content,
            },
        );
        Ok(FileId(id))
    }

    async fn read_file(&self, file: &FileId) -> Result<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(&file.0)
            .map(|f| f.content.clone())
            .ok_or_else(|| anyhow!("no such file: {file}"))
    }

    async fn update_file(&self, file: &FileId, content: Vec<u8>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let node = inner
            .files
            .get_mut(&file.0)
            .ok_or_else(|| anyhow!("no such file: {file}"))?;
        node.content = content;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_scoped_to_parent() {
        let store = MemoryStore::new();
        let root = store.root();
        let a = store.create_folder(&root, "a").await.unwrap();
        store.create_folder(&a, "child").await.unwrap();

        assert!(store.find_folder(&root, "child").await.unwrap().is_none());
        assert!(store.find_folder(&a, "child").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn name_match_is_case_sensitive() {
        let store = MemoryStore::new();
        let root = store.root();
        store.create_folder(&root, "Group_A").await.unwrap();
        assert!(store.find_folder(&root, "group_a").await.unwrap().is_none());
    }
}
