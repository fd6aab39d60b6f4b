//! HTTP surface exercised through the router with `oneshot`

mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

use common::{API_KEY, FakeDrive};
use drive_playlist::{AppState, Config, build_app};

fn app(config: Config) -> Router {
    build_app(AppState::new(config).unwrap())
}

fn configured(base_url: String) -> Config {
    Config {
        api_key: Some(API_KEY.to_string()),
        root_folder_id: Some("root".to_string()),
        drive_api_base_url: base_url,
        ..Config::default()
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), content_type)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body, _) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn library() -> FakeDrive {
    FakeDrive::new()
        .folder("root", "a", "A")
        .file("a", "v1", "Artist - video1.mp4", "video/mp4")
        .file("a", "s1", "Artist - video1.srt", "application/x-subrip")
        .file("root", "v2", "video2.webm", "video/webm")
        .file("root", "n1", "cover.jpg", "image/jpeg")
        .content("s1", "1\r\n00:00:01,000 --> 00:00:02,500\r\nHello\r\n")
}

#[tokio::test]
async fn test_healthz() {
    let (status, body) = get_json(app(Config::default()), "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_reflects_configuration() {
    let (_, body) = get_json(app(Config::default()), "/readyz").await;
    assert_eq!(body["ready"], false);
    assert_eq!(body["api_key_configured"], false);

    let (_, body) = get_json(app(configured("http://unused".to_string())), "/readyz").await;
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_videos_without_credentials_is_config_error() {
    let drive = library();
    let config = Config {
        drive_api_base_url: drive.spawn().await,
        ..Config::default()
    };
    let (status, body) = get_json(app(config), "/api/videos").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("GOOGLE_DRIVE_API_KEY"));
    assert_eq!(body["debug"]["hasApiKey"], false);
    assert_eq!(body["debug"]["hasFolderId"], false);
    assert!(drive.requests().is_empty());
}

#[tokio::test]
async fn test_videos_missing_folder_only() {
    let drive = library();
    let config = Config {
        api_key: Some(API_KEY.to_string()),
        drive_api_base_url: drive.spawn().await,
        ..Config::default()
    };
    let (status, body) = get_json(app(config), "/api/videos").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["debug"]["hasApiKey"], true);
    assert_eq!(body["debug"]["hasFolderId"], false);
    assert!(drive.requests().is_empty());
}

#[tokio::test]
async fn test_subtitles_without_key_makes_no_drive_call() {
    let drive = library();
    let config = Config {
        drive_api_base_url: drive.spawn().await,
        ..Config::default()
    };
    let (status, body) = get_json(app(config), "/api/subtitles/s1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["debug"]["hasApiKey"], false);
    assert!(drive.requests().is_empty());
}

#[tokio::test]
async fn test_videos_catalog() {
    let drive = library();
    let base_url = drive.spawn().await;

    let (status, body) = get_json(app(configured(base_url)), "/api/videos").await;
    assert_eq!(status, StatusCode::OK);

    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);

    assert_eq!(videos[0]["videoId"], "v1");
    assert_eq!(videos[0]["folderPath"], "A");
    assert_eq!(videos[0]["artist"], "Artist");
    assert_eq!(videos[0]["title"], "video1");
    assert_eq!(videos[0]["subtitleId"], "s1");
    assert_eq!(videos[0]["subtitleTrackUrl"], "/api/subtitles/s1");
    assert_eq!(
        videos[0]["embedUrl"],
        "https://drive.google.com/file/d/v1/preview"
    );

    assert_eq!(videos[1]["videoId"], "v2");
    assert_eq!(videos[1]["folderPath"], "Root");
    assert_eq!(videos[1]["subtitleId"], Value::Null);

    assert_eq!(body["folders"], serde_json::json!(["A", "Root"]));
    assert_eq!(body["diagnostics"]["foldersScanned"], 2);
    assert_eq!(body["diagnostics"]["unmatchedVideos"], 1);
}

#[tokio::test]
async fn test_videos_query_overrides_and_filters() {
    let drive = library();
    let base_url = drive.spawn().await;
    let config = Config {
        drive_api_base_url: base_url,
        ..Config::default()
    };

    let uri = format!("/api/videos?apiKey={}&folderId=root&folder=Root&folder=Elsewhere", API_KEY);
    let (status, body) = get_json(app(config.clone()), &uri).await;
    assert_eq!(status, StatusCode::OK);
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["videoId"], "v2");

    let uri = format!("/api/videos?apiKey={}&folderId=root&search=ARTIST", API_KEY);
    let (_, body) = get_json(app(config), &uri).await;
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["videoId"], "v1");
}

#[tokio::test]
async fn test_subtitle_track_is_served_as_vtt() {
    let drive = library();
    let base_url = drive.spawn().await;

    let (status, body, content_type) = get(app(configured(base_url)), "/api/subtitles/s1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/vtt; charset=utf-8"));
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.500\nHello\n"
    );
}

#[tokio::test]
async fn test_subtitle_route_rejects_other_files() {
    let drive = library();
    let base_url = drive.spawn().await;
    let app = app(configured(base_url));

    let (status, _) = get_json(app.clone(), "/api/subtitles/v1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(app, "/api/subtitles/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subtitle_route_rejects_path_tricks() {
    let drive = library();
    let base_url = drive.spawn().await;
    let app = app(configured(base_url));

    for uri in [
        "/api/subtitles/..%2Fabout",
        "/api/subtitles/s1%3Falt%3Dmedia",
        "/api/subtitles/s1%23x",
    ] {
        let (status, body, _) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(!String::from_utf8_lossy(&body).contains(API_KEY));
    }
    assert!(drive.requests().is_empty());
}

#[tokio::test]
async fn test_debug_reports_presence_without_secrets() {
    let config = Config {
        api_key: Some(API_KEY.to_string()),
        ..Config::default()
    };

    let (status, body, _) = get(app(config), "/api/debug?folderId=from-query").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!String::from_utf8_lossy(&body).contains(API_KEY));

    let body: Value = serde_json::from_slice(&body).unwrap();
    let resolved = &body["debug"]["resolved"];
    assert_eq!(resolved["hasApiKey"], true);
    assert_eq!(resolved["apiKeySource"], "env");
    assert_eq!(resolved["folderIdSource"], "query");
    assert_eq!(resolved["apiKeyLength"], API_KEY.len());
}

#[tokio::test]
async fn test_drive_connection_check() {
    let drive = FakeDrive::new()
        .folder("", "root", "Music")
        .folder("root", "a", "A")
        .file("root", "v1", "clip.mp4", "video/mp4");
    let base_url = drive.spawn().await;

    let (status, body) = get_json(app(configured(base_url)), "/api/drive/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["folderInfo"]["name"], "Music");
    assert_eq!(body["sampleFiles"].as_array().unwrap().len(), 2);
    assert_eq!(body["maskedApiKey"], "tes...234");
}
