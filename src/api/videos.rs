//! Video catalog endpoint consumed by the playlist UI

use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, config_error};
use crate::app::AppState;
use crate::media::PlaylistFilter;
use crate::services::Catalog;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosQuery {
    /// Overrides GOOGLE_DRIVE_API_KEY when overrides are allowed
    pub api_key: Option<String>,
    /// Overrides GOOGLE_DRIVE_FOLDER_ID when overrides are allowed
    pub folder_id: Option<String>,
    /// Free-text search over title, artist and folder
    pub search: Option<String>,
    /// Folder paths to keep; may repeat
    #[serde(default)]
    pub folder: Vec<String>,
}

/// Crawl the configured folder tree and return paired videos
async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<VideosQuery>,
) -> Result<Json<Catalog>, ApiError> {
    let config = state.catalog.config();
    let (api_key, api_key_source) = config.api_key_with_source(query.api_key.as_deref());
    let (folder_id, folder_source) = config.root_folder_with_source(query.folder_id.as_deref());

    debug!(
        has_api_key = api_key.is_some(),
        api_key_length = api_key.as_deref().map(str::len).unwrap_or(0),
        api_key_source = ?api_key_source,
        has_folder_id = folder_id.is_some(),
        folder_id_source = ?folder_source,
        "Video catalog request received"
    );

    let credentials = config
        .resolve_credentials(query.api_key.as_deref(), query.folder_id.as_deref())
        .map_err(|e| config_error(e, api_key.is_some(), folder_id.is_some()))?;

    let filter = PlaylistFilter {
        search: query.search,
        folders: query.folder,
    };

    Ok(Json(state.catalog.build(&credentials, &filter).await))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/videos", get(list_videos))
}
