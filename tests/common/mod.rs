//! Local stand-in for the Google Drive v3 `files` API
//!
//! Supports the subset the crawler uses: `files.list` with `'<id>' in parents`
//! queries and page tokens, `files.get` metadata, and `alt=media` downloads.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use drive_playlist::media::RemoteFile;
use drive_playlist::services::{DriveError, StorageListing};

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const API_KEY: &str = "test-api-key-1234";

#[derive(Debug, Clone)]
pub struct FakeFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parent: String,
}

#[derive(Default)]
struct FakeDriveState {
    files: Vec<FakeFile>,
    contents: HashMap<String, String>,
    /// Max items per page regardless of the requested pageSize
    page_cap: Option<usize>,
    /// parent id -> (status, remaining failures) for list calls
    list_failures: Mutex<HashMap<String, (u16, u32)>>,
    /// Every request's query parameters in arrival order, plus `path` for
    /// requests outside the list route
    requests: Mutex<Vec<HashMap<String, String>>>,
}

#[derive(Clone, Default)]
pub struct FakeDrive {
    state: Arc<FakeDriveState>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut FakeDriveState {
        Arc::get_mut(&mut self.state).expect("configure FakeDrive before spawning")
    }

    pub fn folder(mut self, parent: &str, id: &str, name: &str) -> Self {
        self.state_mut().files.push(FakeFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: FOLDER_MIME.to_string(),
            parent: parent.to_string(),
        });
        self
    }

    pub fn file(mut self, parent: &str, id: &str, name: &str, mime_type: &str) -> Self {
        self.state_mut().files.push(FakeFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parent: parent.to_string(),
        });
        self
    }

    pub fn content(mut self, id: &str, body: &str) -> Self {
        self.state_mut()
            .contents
            .insert(id.to_string(), body.to_string());
        self
    }

    pub fn page_cap(mut self, cap: usize) -> Self {
        self.state_mut().page_cap = Some(cap);
        self
    }

    pub fn fail_listing(self, parent: &str, status: u16, times: u32) -> Self {
        self.state
            .list_failures
            .lock()
            .unwrap()
            .insert(parent.to_string(), (status, times));
        self
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the `DRIVE_API_BASE_URL` to use
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/drive/v3/files", get(list_files))
            .route("/drive/v3/files/{id}", get(get_file))
            .fallback(unknown_route)
            .with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/drive/v3", addr)
    }
}

fn drive_error(status: u16, message: &str) -> Response {
    (
        StatusCode::from_u16(status).unwrap(),
        Json(json!({ "error": { "code": status, "message": message } })),
    )
        .into_response()
}

fn resource(file: &FakeFile) -> serde_json::Value {
    json!({
        "id": file.id,
        "name": file.name,
        "mimeType": file.mime_type,
        "parents": [file.parent],
    })
}

/// The id inside `'<id>' in parents`
fn parent_of(q: &str) -> Option<String> {
    let rest = q.strip_prefix('\'')?;
    let end = rest.find("' in parents")?;
    Some(rest[..end].to_string())
}

fn matches_query(file: &FakeFile, q: &str) -> bool {
    if q.contains(&format!("mimeType = '{}'", FOLDER_MIME)) {
        return file.mime_type == FOLDER_MIME;
    }
    if q.contains("mimeType contains 'video/'") {
        return file.mime_type.contains("video/")
            || file.name.contains(".vtt")
            || file.name.contains(".srt");
    }
    true
}

async fn list_files(
    State(drive): State<FakeDrive>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    drive.state.requests.lock().unwrap().push(params.clone());

    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return drive_error(400, "API key not valid. Please pass a valid API key.");
    }

    let q = params.get("q").cloned().unwrap_or_default();
    let Some(parent) = parent_of(&q) else {
        return drive_error(400, "Invalid Value");
    };

    {
        let mut failures = drive.state.list_failures.lock().unwrap();
        if let Some((status, remaining)) = failures.get_mut(&parent) {
            if *remaining > 0 {
                *remaining -= 1;
                let status = *status;
                return drive_error(status, "Backend Error");
            }
        }
    }

    let matching: Vec<&FakeFile> = drive
        .state
        .files
        .iter()
        .filter(|f| f.parent == parent && matches_query(f, &q))
        .collect();

    let requested = params
        .get("pageSize")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(100);
    let page_size = drive.state.page_cap.map_or(requested, |cap| cap.min(requested));
    let offset = params
        .get("pageToken")
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0);

    let page: Vec<serde_json::Value> = matching
        .iter()
        .skip(offset)
        .take(page_size)
        .map(|f| resource(f))
        .collect();
    let next = offset + page_size;

    let mut body = json!({ "files": page });
    if next < matching.len() {
        body["nextPageToken"] = json!(next.to_string());
    }
    Json(body).into_response()
}

async fn get_file(
    State(drive): State<FakeDrive>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut recorded = params.clone();
    recorded.insert("path".to_string(), format!("/drive/v3/files/{}", id));
    drive.state.requests.lock().unwrap().push(recorded);

    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return drive_error(400, "API key not valid. Please pass a valid API key.");
    }

    let Some(file) = drive.state.files.iter().find(|f| f.id == id) else {
        return drive_error(404, &format!("File not found: {}.", id));
    };

    if params.get("alt").map(String::as_str) == Some("media") {
        return match drive.state.contents.get(&id) {
            Some(body) => body.clone().into_response(),
            None => drive_error(404, "No content"),
        };
    }

    Json(resource(file)).into_response()
}

async fn unknown_route(State(drive): State<FakeDrive>, uri: Uri) -> Response {
    let recorded = HashMap::from([("path".to_string(), uri.to_string())]);
    drive.state.requests.lock().unwrap().push(recorded);
    drive_error(404, "Not Found")
}

/// In-memory listing capability for pipeline tests that need no HTTP
#[derive(Default)]
pub struct MemoryListing {
    pub folders: HashMap<String, Vec<RemoteFile>>,
    pub files: HashMap<String, Vec<RemoteFile>>,
    pub failing: Vec<String>,
}

impl MemoryListing {
    pub fn folder(mut self, parent: &str, id: &str, name: &str) -> Self {
        self.folders
            .entry(parent.to_string())
            .or_default()
            .push(remote(id, name, FOLDER_MIME, parent));
        self
    }

    pub fn file(mut self, parent: &str, id: &str, name: &str, mime_type: &str) -> Self {
        self.files
            .entry(parent.to_string())
            .or_default()
            .push(remote(id, name, mime_type, parent));
        self
    }

    pub fn failing(mut self, folder_id: &str) -> Self {
        self.failing.push(folder_id.to_string());
        self
    }
}

pub fn remote(id: &str, name: &str, mime_type: &str, parent: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        parent_folder_id: Some(parent.to_string()),
    }
}

#[async_trait]
impl StorageListing for MemoryListing {
    async fn list_child_folders(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError> {
        if self.failing.iter().any(|f| f == folder_id) {
            return Err(DriveError::Status {
                status: 503,
                message: "Backend Error".to_string(),
            });
        }
        Ok(self.folders.get(folder_id).cloned().unwrap_or_default())
    }

    async fn list_child_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError> {
        if self.failing.iter().any(|f| f == folder_id) {
            return Err(DriveError::Status {
                status: 503,
                message: "Backend Error".to_string(),
            });
        }
        Ok(self.files.get(folder_id).cloned().unwrap_or_default())
    }
}
