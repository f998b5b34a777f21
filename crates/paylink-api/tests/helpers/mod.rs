//! Test helpers: build AppState and router over in-memory stores.
//!
//! Run with: `cargo test -p paylink-api`

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use paylink_api::setup::{routes, services, storage};
use paylink_api::AppState;
use paylink_core::{Config, PaylinkConfig};
use serde_json::Value;
use std::sync::Arc;

pub const PUBLIC_BASE_URL: &str = "https://paylink.test";
pub const OWNER: &str = "alice";

/// API path prefix for tests
pub fn api_path(path: &str) -> String {
    format!("{}{}", paylink_api::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Same as `setup_test_app` with a hook to adjust the config first.
pub async fn setup_test_app_with(adjust: impl FnOnce(&mut PaylinkConfig)) -> TestApp {
    let mut inner = PaylinkConfig::in_memory(PUBLIC_BASE_URL);
    adjust(&mut inner);
    let config = Config(Box::new(inner));

    let storage = storage::setup_storage(&config).await.unwrap();
    let state = services::initialize_services(&config, None, storage).unwrap();
    let router = routes::setup_routes(&config, state.clone()).unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        state,
    }
}

pub fn file_part(name: &str, content_type: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(name.to_string())
        .mime_type(content_type.to_string())
}

/// Upload form with the given price and a single PNG
pub fn image_form(title: &str, price: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("description", "Some pictures".to_string())
        .add_text("price", price.to_string())
        .add_text("currency", "USD".to_string())
        .add_part("file", file_part("photo.png", "image/png", b"\x89PNG"))
}

/// Upload as `owner` and return the JSON body of the 201 response
pub async fn publish(client: &TestServer, owner: &str, form: MultipartForm) -> Value {
    let response = client
        .post(&api_path("/content"))
        .add_header("X-Owner-Id", owner)
        .multipart(form)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub fn content_id(published: &Value) -> String {
    published["content"]["id"].as_str().unwrap().to_string()
}
