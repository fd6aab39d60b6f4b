//! HTTP route definitions
//!
//! Every catalog route resolves its credentials first. A missing API key or
//! root folder id fails the request before any Drive call is made.

pub mod diagnostics;
pub mod health;
pub mod subtitles;
pub mod videos;

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;

use crate::config::ConfigError;
use crate::services::DriveError;

/// Error half of every JSON handler
pub type ApiError = (StatusCode, Json<Value>);

/// Configuration error: fatal for the request, reported with presence flags only
pub fn config_error(err: ConfigError, has_api_key: bool, has_folder_id: bool) -> ApiError {
    warn!(error = %err, has_api_key, has_folder_id, "Rejecting request with missing configuration");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": format!("{}. Check GOOGLE_DRIVE_API_KEY and GOOGLE_DRIVE_FOLDER_ID.", err),
            "debug": {
                "hasApiKey": has_api_key,
                "hasFolderId": has_folder_id,
            }
        })),
    )
}

/// Upstream Drive failure outside the best-effort crawl
pub fn drive_error(err: DriveError) -> ApiError {
    let status = match &err {
        DriveError::Status { status: 404, .. } | DriveError::InvalidId(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    warn!(error = %err, status = %status, "Drive request failed");
    (status, Json(json!({ "error": err.to_string() })))
}
