use super::*;
use crate::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;


/// Config pointing every filesystem surface into a fresh tempdir
///
/// Swagger UI is disabled so router tests stay focused on the routes under
/// test.
fn test_config() -> (Config, tempfile::TempDir) {
    let root = tempfile::tempdir().expect("create tempdir");
    let output_dir = root.path().join("downloads");
    std::fs::create_dir(&output_dir).expect("create output dir");

    let config = Config {
        output_dir,
        ui_dir: root.path().join("public"),
        assets_dir: root.path().join("assets"),
        cookies_file: root.path().join("cookies.txt"),
        swagger_ui: false,
        ..Config::default()
    };
    (config, root)
}

/// Read a response body to completion as a string
///
/// For SSE responses this only returns once the stream has terminated, which
/// is itself part of what the tests assert.
async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// SSE event names in the order they appear in a raw stream body
fn event_names(body: &str) -> Vec<&str> {
    body.lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect()
}
