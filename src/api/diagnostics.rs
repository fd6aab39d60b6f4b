//! Configuration and connectivity diagnostics
//!
//! Secrets never leave the server: only presence flags, lengths, sources
//! and a masked key are reported.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::{ApiError, config_error, drive_error};
use crate::app::AppState;
use crate::media::RemoteFile;

/// Children listed by the connectivity check
const SAMPLE_SIZE: u32 = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialQuery {
    pub api_key: Option<String>,
    pub folder_id: Option<String>,
}

/// Keep the first and last three characters of a key
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", head, tail)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Where each credential would come from for this request
async fn debug_config(
    State(state): State<AppState>,
    Query(query): Query<CredentialQuery>,
) -> Json<Value> {
    let config = state.catalog.config();
    let (api_key, api_key_source) = config.api_key_with_source(query.api_key.as_deref());
    let (folder_id, folder_source) = config.root_folder_with_source(query.folder_id.as_deref());
    let query_api_key = non_blank(query.api_key.as_deref());
    let query_folder_id = non_blank(query.folder_id.as_deref());

    Json(json!({
        "debug": {
            "environment": {
                "hasServerApiKey": config.api_key.is_some(),
                "hasServerFolderId": config.root_folder_id.is_some(),
                "serverApiKeyLength": config.api_key.as_deref().map(str::len).unwrap_or(0),
                "serverFolderIdLength": config.root_folder_id.as_deref().map(str::len).unwrap_or(0),
                "allowCredentialOverride": config.allow_credential_override,
            },
            "request": {
                "hasQueryApiKey": query_api_key.is_some(),
                "hasQueryFolderId": query_folder_id.is_some(),
                "queryApiKeyLength": query_api_key.map(str::len).unwrap_or(0),
                "queryFolderIdLength": query_folder_id.map(str::len).unwrap_or(0),
            },
            "resolved": {
                "hasApiKey": api_key.is_some(),
                "hasFolderId": folder_id.is_some(),
                "apiKeyLength": api_key.as_deref().map(str::len).unwrap_or(0),
                "folderIdLength": folder_id.as_deref().map(str::len).unwrap_or(0),
                "apiKeySource": api_key_source,
                "folderIdSource": folder_source,
            }
        }
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub success: bool,
    pub message: &'static str,
    pub folder_info: RemoteFile,
    pub sample_files: Vec<RemoteFile>,
    pub masked_api_key: String,
}

/// Fetch the root folder and a few of its children with the resolved credentials
async fn test_connection(
    State(state): State<AppState>,
    Query(query): Query<CredentialQuery>,
) -> Result<Json<ConnectionReport>, ApiError> {
    let config = state.catalog.config();
    let (api_key, _) = config.api_key_with_source(query.api_key.as_deref());
    let (folder_id, _) = config.root_folder_with_source(query.folder_id.as_deref());

    let credentials = config
        .resolve_credentials(query.api_key.as_deref(), query.folder_id.as_deref())
        .map_err(|e| config_error(e, api_key.is_some(), folder_id.is_some()))?;

    let client = state.catalog.drive_client(&credentials.api_key);
    let folder_info = client
        .get_file(&credentials.root_folder_id)
        .await
        .map_err(drive_error)?;
    let sample_files = client
        .sample_children(&credentials.root_folder_id, SAMPLE_SIZE)
        .await
        .map_err(drive_error)?;

    info!(
        folder_id = %credentials.root_folder_id,
        folder_name = %folder_info.name,
        samples = sample_files.len(),
        "Drive connection check succeeded"
    );

    Ok(Json(ConnectionReport {
        success: true,
        message: "Google Drive API connection successful",
        folder_info,
        sample_files,
        masked_api_key: mask_key(&credentials.api_key),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/debug", get(debug_config))
        .route("/drive/test", get(test_connection))
}
