//! Playlist search and folder filtering

use super::VideoWithSubtitle;

/// Distinct folder paths in first-seen order
pub fn folder_paths(videos: &[VideoWithSubtitle]) -> Vec<String> {
    let mut folders: Vec<String> = Vec::new();
    for video in videos {
        if !video.folder_path.is_empty() && !folders.contains(&video.folder_path) {
            folders.push(video.folder_path.clone());
        }
    }
    folders
}

/// Filter applied to the paired catalog before it is returned
#[derive(Debug, Clone, Default)]
pub struct PlaylistFilter {
    /// Case-insensitive text matched against title, artist and folder path
    pub search: Option<String>,
    /// Keep only videos from these folder paths (any of them)
    pub folders: Vec<String>,
}

impl PlaylistFilter {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.search_term().is_none()
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, video: &VideoWithSubtitle) -> bool {
        if !self.folders.is_empty() && !self.folders.contains(&video.folder_path) {
            return false;
        }

        match self.search_term() {
            Some(term) => {
                video.title.to_lowercase().contains(&term)
                    || video
                        .artist
                        .as_deref()
                        .is_some_and(|artist| artist.to_lowercase().contains(&term))
                    || video.folder_path.to_lowercase().contains(&term)
            }
            None => true,
        }
    }

    /// Keep the matching videos, preserving order
    pub fn apply(&self, videos: Vec<VideoWithSubtitle>) -> Vec<VideoWithSubtitle> {
        if self.is_empty() {
            return videos;
        }
        videos.into_iter().filter(|v| self.matches(v)).collect()
    }
}
