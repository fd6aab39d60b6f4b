//! Video / subtitle pairing
//!
//! Every video independently picks the first subtitle whose stripped name
//! equals its own (case-insensitive), falling back to the first subtitle whose
//! stripped name contains, or is contained in, the video's stripped name.
//! The match is greedy per video, so one subtitle may serve several videos.

use tracing::debug;

use super::{FileInfo, VideoWithSubtitle, is_subtitle_name, is_video_mime, strip_extension};

/// Separator between artist and title in "Artist - Title.ext" filenames
pub const ARTIST_TITLE_SEPARATOR: &str = " - ";

/// Builds the URLs handed to the player from file ids
#[derive(Debug, Clone)]
pub struct DriveLinks {
    drive_base: String,
    subtitle_route: String,
}

impl Default for DriveLinks {
    fn default() -> Self {
        Self {
            drive_base: "https://drive.google.com".to_string(),
            subtitle_route: "/api/subtitles".to_string(),
        }
    }
}

impl DriveLinks {
    pub fn view_url(&self, id: &str) -> String {
        format!("{}/uc?export=view&id={}", self.drive_base, id)
    }

    pub fn embed_url(&self, id: &str) -> String {
        format!("{}/file/d/{}/preview", self.drive_base, id)
    }

    pub fn download_url(&self, id: &str) -> String {
        format!("{}/uc?export=download&id={}", self.drive_base, id)
    }

    /// Route on this service that serves the subtitle as WebVTT
    pub fn subtitle_track_url(&self, id: &str) -> String {
        format!("{}/{}", self.subtitle_route, id)
    }
}

/// Artist and title parsed from a filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    pub artist: Option<String>,
    pub title: String,
}

/// Parse "Artist - Title.ext". Only the first separator splits.
pub fn parse_title(filename: &str) -> TitleParts {
    let stem = strip_extension(filename);
    match stem.split_once(ARTIST_TITLE_SEPARATOR) {
        Some((artist, title)) => TitleParts {
            artist: (!artist.is_empty()).then(|| artist.to_string()),
            title: title.to_string(),
        },
        None => TitleParts {
            artist: None,
            title: stem.to_string(),
        },
    }
}

struct SubtitleCandidate<'a> {
    file: &'a FileInfo,
    stem: String,
}

fn best_subtitle<'a>(video_stem: &str, subtitles: &[SubtitleCandidate<'a>]) -> Option<&'a FileInfo> {
    if let Some(exact) = subtitles.iter().find(|sub| sub.stem == video_stem) {
        return Some(exact.file);
    }

    subtitles
        .iter()
        .find(|sub| video_stem.contains(&sub.stem) || sub.stem.contains(video_stem))
        .map(|sub| sub.file)
}

/// Pair every video in `files` with its best subtitle.
///
/// Output order follows the input order of the videos.
pub fn pair(files: &[FileInfo], links: &DriveLinks) -> Vec<VideoWithSubtitle> {
    let mut videos = Vec::new();
    let mut subtitles = Vec::new();

    // A file may land in both lists: MIME decides videos, the name decides subtitles
    for info in files {
        if is_video_mime(&info.file.mime_type) {
            videos.push(info);
        }
        if is_subtitle_name(&info.file.name) {
            subtitles.push(SubtitleCandidate {
                file: info,
                stem: strip_extension(&info.file.name).to_lowercase(),
            });
        }
    }

    debug!(
        videos = videos.len(),
        subtitles = subtitles.len(),
        "Pairing videos with subtitles"
    );

    videos
        .into_iter()
        .map(|info| {
            let video = &info.file;
            let video_stem = strip_extension(&video.name).to_lowercase();
            let subtitle = best_subtitle(&video_stem, &subtitles);
            let TitleParts { artist, title } = parse_title(&video.name);

            VideoWithSubtitle {
                video_id: video.id.clone(),
                file_name: video.name.clone(),
                video_url: links.view_url(&video.id),
                embed_url: links.embed_url(&video.id),
                download_url: links.download_url(&video.id),
                subtitle_id: subtitle.map(|s| s.file.id.clone()),
                subtitle_url: subtitle.map(|s| links.download_url(&s.file.id)),
                subtitle_track_url: subtitle.map(|s| links.subtitle_track_url(&s.file.id)),
                title,
                artist,
                folder_path: info.folder_path.clone(),
            }
        })
        .collect()
}
