//! Google Drive v3 REST client
//!
//! Implements the storage listing capability used by the crawler:
//! - `list_child_folders`: immediate child folders, trashed items excluded
//! - `list_child_files`: immediate child videos and `.vtt`/`.srt` files
//!
//! Both drain every page before returning. Page tokens never leave this module.
//! Authentication is a bare API key sent as the `key` query parameter.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::rate_limiter::{RateLimitedClient, RetryConfig, is_transient_status, retry_async};
use crate::media::RemoteFile;

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,parents)";
const FILE_FIELDS: &str = "id,name,mimeType,parents";

/// Failure of a single Drive call
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Drive request failed: {0}")]
    Request(reqwest::Error),

    #[error("Drive API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected Drive response: {0}")]
    Decode(String),

    #[error("Invalid Drive file id {0:?}")]
    InvalidId(String),
}

/// The request URL carries the API key, so it never reaches the error text
impl From<reqwest::Error> for DriveError {
    fn from(e: reqwest::Error) -> Self {
        DriveError::Request(e.without_url())
    }
}

fn decode_error(e: reqwest::Error) -> DriveError {
    DriveError::Decode(e.without_url().to_string())
}

impl DriveError {
    /// Whether another attempt could succeed (network, timeouts, rate limits, 5xx)
    pub fn is_transient(&self) -> bool {
        match self {
            DriveError::Request(e) => !e.is_decode() && !e.is_builder(),
            DriveError::Status { status, message } => {
                is_transient_status(*status)
                    || (*status == 403 && message.to_lowercase().contains("rate limit"))
            }
            DriveError::Decode(_) | DriveError::InvalidId(_) => false,
        }
    }
}

/// The storage listing capability the crawler depends on
#[async_trait]
pub trait StorageListing: Send + Sync {
    /// Immediate child folders of `folder_id`
    async fn list_child_folders(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError>;

    /// Immediate child media files (videos and subtitles) of `folder_id`
    async fn list_child_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError>;
}

/// One `files` entry as Drive returns it. Every field may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileResource {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DriveFileResource {
    /// Convert into a [`RemoteFile`], or `None` when `id` or `name` is missing
    pub fn into_remote(self) -> Option<RemoteFile> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let name = self.name?;
        Some(RemoteFile {
            id,
            name,
            mime_type: self.mime_type.unwrap_or_default(),
            parent_folder_id: self.parents.into_iter().next(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFileResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveErrorBody {
    error: DriveErrorDetail,
}

#[derive(Debug, Deserialize)]
struct DriveErrorDetail {
    message: Option<String>,
}

/// Drive query literal: single quotes and backslashes are escaped
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `q` for the immediate child folders of `folder_id`
pub fn child_folders_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType = '{}' and trashed = false",
        escape_query_literal(folder_id),
        FOLDER_MIME_TYPE
    )
}

/// `q` for the immediate child media files of `folder_id`
pub fn child_media_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and (mimeType contains 'video/' or name contains '.vtt' or name contains '.srt') and trashed = false",
        escape_query_literal(folder_id)
    )
}

/// `q` for every non-trashed child of `folder_id`
pub fn all_children_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and trashed = false",
        escape_query_literal(folder_id)
    )
}

/// Drive ids only use URL-safe characters
pub fn is_valid_file_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Settings for a [`DriveClient`]
#[derive(Debug, Clone)]
pub struct DriveClientConfig {
    pub base_url: String,
    pub page_size: u32,
    pub retry: RetryConfig,
}

/// Google Drive client bound to one API key
#[derive(Clone)]
pub struct DriveClient {
    http: Arc<RateLimitedClient>,
    config: DriveClientConfig,
    api_key: String,
}

impl DriveClient {
    pub fn new(http: Arc<RateLimitedClient>, config: DriveClientConfig, api_key: String) -> Self {
        Self {
            http,
            config,
            api_key,
        }
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.config.base_url)
    }

    fn file_url(&self, file_id: &str) -> Result<String, DriveError> {
        if !is_valid_file_id(file_id) {
            return Err(DriveError::InvalidId(file_id.to_string()));
        }
        Ok(format!("{}/{}", self.files_url(), file_id))
    }

    /// One GET with retry; non-2xx becomes [`DriveError::Status`]
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, DriveError> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(query.len() + 1);
        params.push(("key", self.api_key.as_str()));
        params.extend_from_slice(query);

        let params = &params;
        retry_async(
            move || async move {
                let resp = self.http.get_with_query(url, params).await?;
                let status = resp.status();
                if status.is_success() {
                    return Ok(resp);
                }
                let body = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<DriveErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.error.message)
                    .unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or("unknown error")
                            .to_string()
                    });
                Err(DriveError::Status {
                    status: status.as_u16(),
                    message,
                })
            },
            &self.config.retry,
            "drive.get",
            DriveError::is_transient,
        )
        .await
    }

    /// Run a `files.list` query and drain every page
    async fn list_all(&self, q: &str) -> Result<Vec<RemoteFile>, DriveError> {
        let url = self.files_url();
        let page_size = self.config.page_size.to_string();
        let mut files = Vec::new();
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query = vec![
                ("q", q),
                ("fields", LIST_FIELDS),
                ("orderBy", "name"),
                ("pageSize", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: DriveFileList = self
                .get(&url, &query)
                .await?
                .json()
                .await
                .map_err(decode_error)?;
            pages += 1;

            for resource in page.files {
                match resource.into_remote() {
                    Some(file) => files.push(file),
                    None => warn!(query = %q, "Dropping Drive item without id or name"),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if seen_tokens.insert(token.clone()) => page_token = Some(token),
                Some(token) => {
                    warn!(page_token = %token, "Drive repeated a page token, stopping pagination");
                    break;
                }
                None => break,
            }
        }

        debug!(query = %q, pages = pages, items = files.len(), "Drive listing complete");
        Ok(files)
    }

    /// Metadata for a single file or folder
    pub async fn get_file(&self, file_id: &str) -> Result<RemoteFile, DriveError> {
        let url = self.file_url(file_id)?;
        let resource: DriveFileResource = self
            .get(&url, &[("fields", FILE_FIELDS)])
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        resource
            .into_remote()
            .ok_or_else(|| DriveError::Decode(format!("file {} has no id or name", file_id)))
    }

    /// First `limit` children of a folder, of any type
    pub async fn sample_children(
        &self,
        folder_id: &str,
        limit: u32,
    ) -> Result<Vec<RemoteFile>, DriveError> {
        let q = all_children_query(folder_id);
        let limit = limit.to_string();
        let page: DriveFileList = self
            .get(
                &self.files_url(),
                &[
                    ("q", q.as_str()),
                    ("fields", LIST_FIELDS),
                    ("orderBy", "name"),
                    ("pageSize", limit.as_str()),
                ],
            )
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        Ok(page
            .files
            .into_iter()
            .filter_map(DriveFileResource::into_remote)
            .collect())
    }

    /// Download a file's content as text
    pub async fn download_text(&self, file_id: &str) -> Result<String, DriveError> {
        let url = self.file_url(file_id)?;
        let resp = self.get(&url, &[("alt", "media")]).await?;
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl StorageListing for DriveClient {
    async fn list_child_folders(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError> {
        let folders = self.list_all(&child_folders_query(folder_id)).await?;
        Ok(folders
            .into_iter()
            .filter(|f| f.mime_type.is_empty() || f.mime_type == FOLDER_MIME_TYPE)
            .collect())
    }

    async fn list_child_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError> {
        self.list_all(&child_media_query(folder_id)).await
    }
}
