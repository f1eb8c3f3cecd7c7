//! Shared test harness for storage backend testing
//!
//! Provides sample records, a router factory mounting a store under
//! `/posts`, and the `resource_store_tests!` / `rest_resource_tests!` macros
//! every backend suite invokes.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_tests;
#[macro_use]
pub mod rest_tests;

use axum::Router;
use axum_test::TestServer;
use serde_json::{Value, json};
use simple_rest::core::{Record, ResourceStore};
use simple_rest::server::ResourceRouter;

/// Convert a JSON object literal into a `Record`
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got: {other}"),
    }
}

/// Three blog posts with distinct titles, view counts and tags
pub fn sample_posts() -> Vec<Value> {
    vec![
        json!({
            "title": "Rust ownership",
            "body": "borrowing explained",
            "views": 10,
            "tags": ["rust", "memory"]
        }),
        json!({
            "title": "Async widget patterns",
            "body": "futures in practice",
            "views": 30,
            "tags": ["rust", "async"]
        }),
        json!({
            "title": "Gardening tips",
            "body": "soil and seeds",
            "views": 20,
            "tags": ["garden"]
        }),
    ]
}

/// Mount `store` under `/posts` with every action enabled
pub fn posts_router(store: impl ResourceStore + 'static) -> Router {
    ResourceRouter::new(store).route("/posts").bind(Router::new())
}

/// Test server over `posts_router`
pub fn posts_server(store: impl ResourceStore + 'static) -> TestServer {
    TestServer::new(posts_router(store)).unwrap()
}

/// POST every sample post and return the created bodies
pub async fn seed_posts(server: &TestServer) -> Vec<Value> {
    let mut created = Vec::new();
    for post in sample_posts() {
        let response = server.post("/posts").json(&post).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        created.push(response.json::<Value>());
    }
    created
}

/// Titles of a list response body, in order
pub fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("list body should be an array")
        .iter()
        .map(|item| item["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
