//! Google Drive backend.
//!
//! Talks to the Drive v3 REST API directly over reqwest. Authenticates with
//! an OAuth2 refresh token and caches the short-lived access token until
//! shortly before expiry.
//!
//! Required credentials (see `chatvault-cli` config):
//!   GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET / GOOGLE_REFRESH_TOKEN
//!   GOOGLE_DRIVE_FOLDER_ID: root folder all partitions live under.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::store::{FileId, FolderId, ObjectStore};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Refresh the cached token this long before it actually expires.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct DriveConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Folder id all partitions are created under.
    pub root_folder_id: String,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct GoogleDriveStore {
    config: DriveConfig,
    http: Client,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileMeta>,
}

#[derive(Deserialize)]
struct FileMeta {
    id: String,
}

impl GoogleDriveStore {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            token: Mutex::new(None),
        }
    }

    pub fn root(&self) -> FolderId {
        FolderId(self.config.root_folder_id.clone())
    }

    /// Get a valid access token, refreshing via the OAuth2 refresh-token
    /// grant when the cached one is missing or near expiry.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_SLACK {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Refreshing Drive access token");
        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("token refresh request failed")?;
        if !resp.status().is_success() {
            bail!("token refresh rejected: {}", resp.text().await.unwrap_or_default());
        }
        let token: TokenResponse = resp.json().await.context("bad token response")?;
        let access = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(access)
    }

    /// Single-quoted Drive query literal with embedded quotes escaped.
    fn quote(value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    async fn find_by_query(&self, query: String) -> Result<Option<String>> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(FILES_URL)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)"), ("pageSize", "1")])
            .send()
            .await
            .context("files.list request failed")?;
        if !resp.status().is_success() {
            bail!("files.list rejected: {}", resp.text().await.unwrap_or_default());
        }
        let list: FileList = resp.json().await.context("bad files.list response")?;
        // First-found order is canonical when duplicates exist.
        Ok(list.files.into_iter().next().map(|f| f.id))
    }
}

#[async_trait]
impl ObjectStore for GoogleDriveStore {
    async fn find_folder(&self, parent: &FolderId, name: &str) -> Result<Option<FolderId>> {
        let query = format!(
            "name={} and {} in parents and mimeType='{}' and trashed=false",
            Self::quote(name),
            Self::quote(&parent.0),
            FOLDER_MIME,
        );
        Ok(self.find_by_query(query).await?.map(FolderId))
    }

    async fn create_folder(&self, parent: &FolderId, name: &str) -> Result<FolderId> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .post(FILES_URL)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "name": name,
                "mimeType": FOLDER_MIME,
                "parents": [parent.0],
            }))
            .send()
            .await
            .context("folder create request failed")?;
        if !resp.status().is_success() {
            bail!("folder create rejected: {}", resp.text().await.unwrap_or_default());
        }
        let meta: FileMeta = resp.json().await.context("bad folder create response")?;
        info!(folder = name, id = %meta.id, "Created Drive folder");
        Ok(FolderId(meta.id))
    }

    async fn find_file(&self, parent: &FolderId, name: &str) -> Result<Option<FileId>> {
        let query = format!(
            "name={} and {} in parents and mimeType!='{}' and trashed=false",
            Self::quote(name),
            Self::quote(&parent.0),
            FOLDER_MIME,
        );
        Ok(self.find_by_query(query).await?.map(FileId))
    }

    async fn create_file(
        &self,
        parent: &FolderId,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<FileId> {
        let token = self.access_token().await?;
        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent.0],
        });
        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")?,
            )
            .part(
                "media",
                reqwest::multipart::Part::bytes(content).mime_str(mime_type)?,
            );
        let resp = self
            .http
            .post(UPLOAD_URL)
            .query(&[("uploadType", "multipart")])
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .context("file upload request failed")?;
        if !resp.status().is_success() {
            bail!("file upload rejected: {}", resp.text().await.unwrap_or_default());
        }
        let meta: FileMeta = resp.json().await.context("bad upload response")?;
        info!(file = name, id = %meta.id, "Uploaded Drive file");
        Ok(FileId(meta.id))
    }

    async fn read_file(&self, file: &FileId) -> Result<Vec<u8>> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(format!("{FILES_URL}/{}", file.0))
            .query(&[("alt", "media")])
            .bearer_auth(token)
            .send()
            .await
            .context("content download request failed")?;
        if !resp.status().is_success() {
            bail!("content download rejected: {}", resp.text().await.unwrap_or_default());
        }
        Ok(resp.bytes().await.context("content download body failed")?.to_vec())
    }

    async fn update_file(&self, file: &FileId, content: Vec<u8>) -> Result<()> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .patch(format!("{UPLOAD_URL}/{}", file.0))
            .query(&[("uploadType", "media")])
            .bearer_auth(token)
            .body(content)
            .send()
            .await
            .context("content update request failed")?;
        if !resp.status().is_success() {
            bail!("content update rejected: {}", resp.text().await.unwrap_or_default());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_literals_escape_quotes() {
        assert_eq!(GoogleDriveStore::quote("plain"), "'plain'");
        assert_eq!(GoogleDriveStore::quote("o'brien"), r"'o\'brien'");
    }
}
