//! Catalog pipeline: crawl -> pair -> filter
//!
//! Each call owns its own crawl state. The only thing shared between
//! requests is the rate-limited HTTP client.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::crawler::{CrawlFailure, crawl};
use super::drive::{DriveClient, DriveClientConfig, StorageListing};
use super::rate_limiter::{RateLimitConfig, RateLimitedClient, RetryConfig};
use crate::config::{Config, DriveCredentials};
use crate::media::{
    DriveLinks, PlaylistFilter, VideoWithSubtitle, folder_paths, is_subtitle_name, pair,
};

/// Non-fatal facts about how the catalog was built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDiagnostics {
    pub folders_scanned: usize,
    pub files_listed: usize,
    pub video_count: usize,
    pub subtitle_count: usize,
    pub unmatched_videos: usize,
    pub failures: Vec<CrawlFailure>,
}

/// Response body of the videos endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub videos: Vec<VideoWithSubtitle>,
    /// Every folder path that holds at least one video, before filtering
    pub folders: Vec<String>,
    pub diagnostics: CatalogDiagnostics,
}

/// Builds catalogs for incoming requests
pub struct CatalogService {
    config: Arc<Config>,
    http: Arc<RateLimitedClient>,
    links: DriveLinks,
}

impl CatalogService {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let http = RateLimitedClient::new(
            "google-drive",
            RateLimitConfig {
                requests_per_second: config.requests_per_second,
                burst_size: config.burst_size,
            },
        )?;

        Ok(Self {
            config,
            http: Arc::new(http),
            links: DriveLinks::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drive client bound to the request's API key
    pub fn drive_client(&self, api_key: &str) -> DriveClient {
        DriveClient::new(
            self.http.clone(),
            DriveClientConfig {
                base_url: self.config.drive_api_base_url.clone(),
                page_size: self.config.page_size,
                retry: RetryConfig {
                    max_retries: self.config.max_retries.max(1),
                    ..RetryConfig::default()
                },
            },
            api_key.to_string(),
        )
    }

    /// Crawl the Drive folder tree for `credentials` and build the catalog
    pub async fn build(&self, credentials: &DriveCredentials, filter: &PlaylistFilter) -> Catalog {
        let client = self.drive_client(&credentials.api_key);
        self.build_with(&client, &credentials.root_folder_id, filter).await
    }

    /// Build the catalog from any listing capability
    pub async fn build_with<L>(
        &self,
        listing: &L,
        root_folder_id: &str,
        filter: &PlaylistFilter,
    ) -> Catalog
    where
        L: StorageListing + ?Sized,
    {
        build_catalog(listing, root_folder_id, &self.config.root_label, &self.links, filter).await
    }
}

/// Run the full pipeline against `listing`
pub async fn build_catalog<L>(
    listing: &L,
    root_folder_id: &str,
    root_label: &str,
    links: &DriveLinks,
    filter: &PlaylistFilter,
) -> Catalog
where
    L: StorageListing + ?Sized,
{
    let report = crawl(root_folder_id, root_label, listing).await;
    let paired = pair(&report.files, links);

    let subtitle_count = report
        .files
        .iter()
        .filter(|f| is_subtitle_name(&f.file.name))
        .count();

    let diagnostics = CatalogDiagnostics {
        folders_scanned: report.folders.len(),
        files_listed: report.files.len(),
        video_count: paired.len(),
        subtitle_count,
        unmatched_videos: paired.iter().filter(|v| v.subtitle_id.is_none()).count(),
        failures: report.failures,
    };

    let folders = folder_paths(&paired);
    let videos = filter.apply(paired);

    info!(
        root_folder_id = %root_folder_id,
        videos = diagnostics.video_count,
        returned = videos.len(),
        subtitles = diagnostics.subtitle_count,
        failures = diagnostics.failures.len(),
        "Catalog built"
    );

    Catalog {
        videos,
        folders,
        diagnostics,
    }
}
