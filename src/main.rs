//! Drive Playlist backend entry point
//!
//! Serves the playlist catalog over HTTP, or runs a single scan with `--scan`.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drive_playlist::cli::{CliOptions, Command};
use drive_playlist::config::{Config, ConfigError, DriveCredentials};
use drive_playlist::media::PlaylistFilter;
use drive_playlist::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let options = CliOptions::from_args();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drive_playlist=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        has_api_key = config.api_key.is_some(),
        has_root_folder = config.root_folder_id.is_some(),
        drive_api = %config.drive_api_base_url,
        "Configuration loaded"
    );

    let host = config.host.clone().unwrap_or_else(|| "0.0.0.0".to_string());
    let port = config.port;
    let state = AppState::new(config)?;

    match options.command {
        Command::Scan => scan_once(&state, options).await,
        Command::Serve => serve(state, &host, port).await,
    }
}

/// Crawl once with env credentials and print the catalog to stdout
async fn scan_once(state: &AppState, options: CliOptions) -> anyhow::Result<()> {
    let api_key = state.config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
    let root_folder_id = options
        .folder_id_override
        .or_else(|| state.config.root_folder_id.clone())
        .ok_or(ConfigError::MissingRootFolder)?;
    let credentials = DriveCredentials {
        api_key,
        root_folder_id,
    };
    let filter = PlaylistFilter {
        search: options.search,
        folders: Vec::new(),
    };

    let catalog = state.catalog.build(&credentials, &filter).await;
    let json = serde_json::to_string_pretty(&catalog).context("Failed to encode catalog")?;
    println!("{}", json);
    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid HOST {:?}", host))?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Video catalog: http://localhost:{}/api/videos", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
