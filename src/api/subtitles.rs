//! Subtitle tracks served as WebVTT
//!
//! Browsers only load WebVTT text tracks, so SubRip files are converted on the way out.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ApiError, config_error, drive_error};
use crate::app::AppState;
use crate::config::ConfigError;
use crate::media::{is_srt, is_subtitle_name, srt_to_vtt};

pub const VTT_CONTENT_TYPE: &str = "text/vtt; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleQuery {
    pub api_key: Option<String>,
}

async fn subtitle_track(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(query): Query<SubtitleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let config = state.catalog.config();
    let (api_key, _) = config.api_key_with_source(query.api_key.as_deref());
    let api_key = api_key.ok_or_else(|| {
        config_error(
            ConfigError::MissingApiKey,
            false,
            config.root_folder_id.is_some(),
        )
    })?;

    let client = state.catalog.drive_client(&api_key);
    let file = client.get_file(&file_id).await.map_err(drive_error)?;
    if !is_subtitle_name(&file.name) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("{} is not a subtitle file", file.name) })),
        ));
    }

    let content = client.download_text(&file_id).await.map_err(drive_error)?;
    let converted = is_srt(&file.name, &content);
    debug!(file_id = %file_id, name = %file.name, converted, "Serving subtitle track");

    let body = if converted { srt_to_vtt(&content) } else { content };
    Ok(([(header::CONTENT_TYPE, VTT_CONTENT_TYPE)], body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/subtitles/{id}", get(subtitle_track))
}
