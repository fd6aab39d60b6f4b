//! Application configuration management

use std::env;

use anyhow::{Context, Result};
use thiserror::Error;

/// Default Google Drive v3 REST endpoint
pub const DEFAULT_DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Label used for the folder path of files stored directly in the root folder
pub const DEFAULT_ROOT_LABEL: &str = "Root";

/// Drive caps `pageSize` at 1000 for `files.list`
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Errors that make a catalog request impossible before any I/O happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Google Drive API key is not configured")]
    MissingApiKey,

    #[error("Google Drive root folder id is not configured")]
    MissingRootFolder,
}

/// Credentials for one catalog request
#[derive(Clone, PartialEq, Eq)]
pub struct DriveCredentials {
    pub api_key: String,
    pub root_folder_id: String,
}

impl std::fmt::Debug for DriveCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveCredentials")
            .field("api_key_len", &self.api_key.len())
            .field("root_folder_id", &self.root_folder_id)
            .finish()
    }
}

/// Where a resolved credential value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    Query,
    Env,
    Missing,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind (default 0.0.0.0)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// Google Drive API key
    pub api_key: Option<String>,

    /// Folder the crawl starts from
    pub root_folder_id: Option<String>,

    /// Drive REST base URL (overridable for tests and proxies)
    pub drive_api_base_url: String,

    /// Folder path label for files that live directly in the root folder
    pub root_label: String,

    /// `pageSize` sent with every listing request
    pub page_size: u32,

    /// Sustained request rate against the Drive API
    pub requests_per_second: u32,

    /// Burst capacity on top of the sustained rate
    pub burst_size: u32,

    /// Attempts per Drive request before giving up
    pub max_retries: u32,

    /// Accept `apiKey`/`folderId` query parameters in place of the env values
    pub allow_credential_override: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            port: 3001,
            api_key: None,
            root_folder_id: None,
            drive_api_base_url: DEFAULT_DRIVE_API_BASE_URL.to_string(),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            page_size: MAX_PAGE_SIZE,
            requests_per_second: 10,
            burst_size: 20,
            max_retries: 3,
            allow_credential_override: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: non_blank("HOST"),

            port: lookup("PORT")
                .unwrap_or_else(|| defaults.port.to_string())
                .parse()
                .context("Invalid PORT")?,

            api_key: non_blank("GOOGLE_DRIVE_API_KEY"),

            root_folder_id: non_blank("GOOGLE_DRIVE_FOLDER_ID"),

            drive_api_base_url: non_blank("DRIVE_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.drive_api_base_url),

            root_label: non_blank("ROOT_FOLDER_LABEL").unwrap_or(defaults.root_label),

            page_size: lookup("DRIVE_PAGE_SIZE")
                .map(|v| v.parse::<u32>().context("Invalid DRIVE_PAGE_SIZE"))
                .transpose()?
                .unwrap_or(defaults.page_size)
                .clamp(1, MAX_PAGE_SIZE),

            requests_per_second: lookup("DRIVE_REQUESTS_PER_SECOND")
                .map(|v| v.parse().context("Invalid DRIVE_REQUESTS_PER_SECOND"))
                .transpose()?
                .unwrap_or(defaults.requests_per_second),

            burst_size: lookup("DRIVE_BURST_SIZE")
                .map(|v| v.parse().context("Invalid DRIVE_BURST_SIZE"))
                .transpose()?
                .unwrap_or(defaults.burst_size),

            max_retries: lookup("DRIVE_MAX_RETRIES")
                .map(|v| v.parse().context("Invalid DRIVE_MAX_RETRIES"))
                .transpose()?
                .unwrap_or(defaults.max_retries),

            allow_credential_override: lookup("ALLOW_CREDENTIAL_OVERRIDE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.allow_credential_override),
        })
    }

    /// Resolve the API key for a request, returning where it came from
    pub fn api_key_with_source(&self, query: Option<&str>) -> (Option<String>, CredentialSource) {
        self.pick(query, self.api_key.as_deref())
    }

    /// Resolve the root folder id for a request, returning where it came from
    pub fn root_folder_with_source(
        &self,
        query: Option<&str>,
    ) -> (Option<String>, CredentialSource) {
        self.pick(query, self.root_folder_id.as_deref())
    }

    /// Resolve the credentials for one request.
    ///
    /// Query values win over environment values when overrides are allowed.
    /// Blank values count as missing.
    pub fn resolve_credentials(
        &self,
        api_key: Option<&str>,
        root_folder_id: Option<&str>,
    ) -> Result<DriveCredentials, ConfigError> {
        let (api_key, _) = self.api_key_with_source(api_key);
        let api_key = api_key.ok_or(ConfigError::MissingApiKey)?;

        let (root_folder_id, _) = self.root_folder_with_source(root_folder_id);
        let root_folder_id = root_folder_id.ok_or(ConfigError::MissingRootFolder)?;

        Ok(DriveCredentials {
            api_key,
            root_folder_id,
        })
    }

    fn pick(&self, query: Option<&str>, env: Option<&str>) -> (Option<String>, CredentialSource) {
        let query = query
            .map(str::trim)
            .filter(|v| !v.is_empty() && self.allow_credential_override);
        if let Some(value) = query {
            return (Some(value.to_string()), CredentialSource::Query);
        }
        match env.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => (Some(value.to_string()), CredentialSource::Env),
            None => (None, CredentialSource::Missing),
        }
    }
}
