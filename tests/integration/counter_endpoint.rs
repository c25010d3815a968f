//! Preview server: counter endpoint and static files

use super::test_utils::TestSite;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use ctos::build::SiteBuilder;
use ctos::config::CounterConfig;
use ctos::server;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str, origin: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(uri)
        .header("CF-Connecting-IP", origin)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_counter_persists_in_sled_store() {
    let site = TestSite::new();
    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let state = server::counter_state(&CounterConfig::default(), site.root()).unwrap();
    let app = server::app(site.root().join("public"), state);

    assert_eq!(get(&app, "/api/counter", "192.0.2.10").await, (StatusCode::OK, "0000001".to_string()));
    assert_eq!(get(&app, "/api/counter", "192.0.2.10").await.1, "0000001");
    assert!(site.root().join(".ctos/counter").exists());
}

#[tokio::test]
async fn test_disabled_counter_serves_placeholder() {
    let site = TestSite::new();
    let config = CounterConfig {
        enabled: false,
        ..CounterConfig::default()
    };
    let state = server::counter_state(&config, site.root()).unwrap();
    let app = server::app(site.root().join("public"), state);

    assert_eq!(get(&app, "/api/counter", "192.0.2.10").await, (StatusCode::OK, "???????".to_string()));
}

#[tokio::test]
async fn test_built_site_is_served() {
    let site = TestSite::new();
    site.content_file("Apps/Notes.md", "# Notes\n");
    SiteBuilder::new(site.build_config()).run().await.unwrap();

    let config = CounterConfig {
        enabled: false,
        ..CounterConfig::default()
    };
    let app = server::app(
        site.root().join("public"),
        server::counter_state(&config, site.root()).unwrap(),
    );

    let (status, body) = get(&app, "/Apps/Notes.html", "x").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Notes</h1>"));

    let (status, body) = get(&app, "/init.json", "x").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"Notes\""));

    let (status, body) = get(&app, "/api/nothing", "x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}
