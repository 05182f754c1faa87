//! End-to-end tests for the server surface itself
//!
//! Stats endpoint, routing fallbacks and request validation.

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn test_stats_endpoint() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_stats().await;

    assert_eq!(response.status(), StatusCode::OK);
    let stats: serde_json::Value = response.json().await.unwrap();
    let uptime = stats["uptime"].as_str().unwrap();
    assert!(uptime.starts_with("0d "), "unexpected uptime: {}", uptime);
    assert!(!stats["hash"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .get(format!("{}/nope", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_returns_405() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .delete(format!("{}/actors", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_relation_without_query_params_returns_400() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .post(format!("{}/movie_actor", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_property_without_json_returns_415() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .post(format!("{}/actors", server.base_url))
        .body("Al Pacino")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}
