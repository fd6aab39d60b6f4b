//! Media catalog data model
//!
//! The pipeline is a pure transform:
//! root folder id -> [`FolderNode`] tree -> [`FileInfo`] list -> [`VideoWithSubtitle`] list.
//! Nothing here is mutated after construction or cached across requests.

pub mod pairing;
pub mod playlist;
pub mod subtitles;

use serde::{Deserialize, Serialize};

pub use pairing::{DriveLinks, pair};
pub use playlist::{PlaylistFilter, folder_paths};
pub use subtitles::{is_srt, srt_to_vtt};

/// Subtitle extensions we recognize (compared case-insensitively)
pub const SUBTITLE_EXTENSIONS: &[&str] = &[".vtt", ".srt"];

/// A single stored object as reported by the storage API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parent_folder_id: Option<String>,
}

/// One discovered folder. Only the root has no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Slash-joined names from the root down to this folder
    pub path: String,
    pub depth: usize,
}

impl FolderNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A media file annotated with the path of the folder that contains it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(flatten)]
    pub file: RemoteFile,
    pub folder_id: String,
    pub folder_path: String,
}

/// Pairing output handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithSubtitle {
    pub video_id: String,
    pub file_name: String,
    pub video_url: String,
    pub embed_url: String,
    pub download_url: String,
    pub subtitle_id: Option<String>,
    pub subtitle_url: Option<String>,
    pub subtitle_track_url: Option<String>,
    pub title: String,
    pub artist: Option<String>,
    pub folder_path: String,
}

pub fn is_video_mime(mime_type: &str) -> bool {
    mime_type.contains("video/")
}

pub fn is_subtitle_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    SUBTITLE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Media filter applied to file listings: `video/*` or a subtitle extension
pub fn is_media_file(file: &RemoteFile) -> bool {
    file.mime_type.starts_with("video/") || is_subtitle_name(&file.name)
}

/// Strip the final extension from a filename.
///
/// The extension must be non-empty and may not contain `/`, so `"Song."`
/// and `"dir.v2/file"` are returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}
