//! Drive Playlist - crawls a Google Drive folder tree, pairs every video with
//! its best-guess subtitle and serves the result as a playlist catalog.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod media;
pub mod services;

pub use app::{AppState, build_app};
pub use config::{Config, ConfigError, DriveCredentials};
