//! Wiremock helpers for GitHub API and manifest endpoints

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::constants::*;

/// Mount `GET /repos/acme/tool/releases/latest` returning `body`
pub async fn mock_latest_release(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/releases/latest", OWNER, REPO)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount `GET /repos/acme/tool/releases/tags/{tag}` returning `body`
pub async fn mock_tagged_release(server: &MockServer, tag: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/releases/tags/{}", OWNER, REPO, tag)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a raw byte response at `route`
pub async fn mock_bytes(server: &MockServer, route: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Mount a failing response at `route`
pub async fn mock_status(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Mount a JSON manifest at `route`
pub async fn mock_manifest(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// All requests the server received for `route`
pub async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

/// Header value as a string, if present
pub fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
