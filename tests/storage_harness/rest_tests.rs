//! REST integration test macro for storage backends.
//!
//! The `rest_resource_tests!` macro generates HTTP-level tests that validate
//! a `ResourceStore` through full REST round-trips:
//! JSON → HTTP request → handler → ResourceStore → HTTP response → JSON.

/// Generate a REST integration test suite for a storage backend.
///
/// `$store_factory` must produce an `impl ResourceStore + 'static` holding
/// no records.
///
/// # Generated Tests
///
/// ## CRUD
/// - `test_rest_create` — POST 201, generated `id`, no `_id`
/// - `test_rest_create_get_round_trip` — GET returns every created field
/// - `test_rest_update_merges_fields` — PUT assigns fields, keeps others
/// - `test_rest_delete` — DELETE 200 `{id}`, then GET 404
///
/// ## List
/// - `test_rest_list_sort_and_range` — sort DESC + range header
/// - `test_rest_list_default_range` — `0-1000/total` header
/// - `test_rest_list_empty_params_are_ignored` — `?sort=&range=&filter=` as absent
/// - `test_rest_list_window_and_total` — total ignores the window
/// - `test_rest_list_filter_*` — pattern, full-text, array, id filters
///
/// ## Errors
/// - `test_rest_get_unknown_returns_404`
/// - `test_rest_update_unknown_returns_404`
/// - `test_rest_delete_unknown_returns_200`
/// - `test_rest_invalid_query_returns_400`
/// - `test_rest_out_of_bounds_range_returns_400`
#[macro_export]
macro_rules! rest_resource_tests {
    ($store_factory:expr) => {
        mod rest_resource_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum::http::header::{ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_RANGE};
            use axum_test::TestServer;
            use serde_json::{Value, json};

            const MISSING_ID: &str = "0000000000000000000000ff";

            async fn make_server() -> TestServer {
                posts_server($store_factory)
            }

            async fn list(server: &TestServer, params: &[(&str, String)]) -> axum_test::TestResponse {
                let mut request = server.get("/posts");
                for (key, value) in params {
                    request = request.add_query_param(key, value);
                }
                request.await
            }

            // ==============================================================
            // CRUD
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let response = server
                    .post("/posts")
                    .json(&json!({"title": "Hello", "views": 1}))
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["title"], "Hello");
                assert_eq!(body["views"], 1);
                assert!(body["id"].as_str().is_some(), "id should be a string");
                assert!(body.get("_id").is_none(), "_id must not be exposed");
            }

            #[tokio::test]
            async fn test_rest_create_get_round_trip() {
                let server = make_server().await;
                let post = sample_posts().remove(0);

                let created: Value = server.post("/posts").json(&post).await.json();
                let id = created["id"].as_str().unwrap();

                let response = server.get(&format!("/posts/{}", id)).await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["id"], id);
                assert!(body.get("_id").is_none());
                for (key, value) in post.as_object().unwrap() {
                    assert_eq!(&body[key], value, "field {}", key);
                }
            }

            #[tokio::test]
            async fn test_rest_update_merges_fields() {
                let server = make_server().await;
                let created = seed_posts(&server).await;
                let id = created[0]["id"].as_str().unwrap();

                let response = server
                    .put(&format!("/posts/{}", id))
                    .json(&json!({"views": 99, "featured": true}))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["id"], id);
                assert_eq!(body["views"], 99);
                assert_eq!(body["featured"], true);
                assert_eq!(body["title"], "Rust ownership");

                let fetched: Value = server.get(&format!("/posts/{}", id)).await.json();
                assert_eq!(fetched["views"], 99);
                assert_eq!(fetched["body"], "borrowing explained");
            }

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;
                let created = seed_posts(&server).await;
                let id = created[1]["id"].as_str().unwrap();

                let response = server.delete(&format!("/posts/{}", id)).await;
                response.assert_status_ok();
                response.assert_json(&json!({"id": id}));

                server
                    .get(&format!("/posts/{}", id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);

                let remaining = list(&server, &[]).await;
                assert_eq!(remaining.json::<Value>().as_array().unwrap().len(), 2);
            }

            // ==============================================================
            // List
            // ==============================================================

            #[tokio::test]
            async fn test_rest_list_sort_and_range() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(
                    &server,
                    &[
                        ("sort", json!(["title", "DESC"]).to_string()),
                        ("range", json!([0, 9]).to_string()),
                    ],
                )
                .await;

                response.assert_status_ok();
                assert_eq!(response.header(CONTENT_RANGE), "0-9/3");
                assert_eq!(response.header(ACCESS_CONTROL_EXPOSE_HEADERS), "Content-Range");
                assert_eq!(
                    titles(&response.json()),
                    vec!["Rust ownership", "Gardening tips", "Async widget patterns"]
                );
            }

            #[tokio::test]
            async fn test_rest_list_default_range() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(&server, &[]).await;

                response.assert_status_ok();
                assert_eq!(response.header(CONTENT_RANGE), "0-1000/3");
                let body: Value = response.json();
                for item in body.as_array().unwrap() {
                    assert!(item["id"].is_string());
                    assert!(item.get("_id").is_none());
                }
            }

            #[tokio::test]
            async fn test_rest_list_empty_params_are_ignored() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(
                    &server,
                    &[
                        ("sort", String::new()),
                        ("range", String::new()),
                        ("filter", String::new()),
                    ],
                )
                .await;

                response.assert_status_ok();
                assert_eq!(response.header(CONTENT_RANGE), "0-1000/3");
                assert_eq!(response.json::<Value>().as_array().unwrap().len(), 3);
            }

            #[tokio::test]
            async fn test_rest_list_window_and_total() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(
                    &server,
                    &[
                        ("sort", json!(["views", "ASC"]).to_string()),
                        ("range", json!([1, 2]).to_string()),
                    ],
                )
                .await;

                assert_eq!(response.header(CONTENT_RANGE), "1-2/3");
                assert_eq!(titles(&response.json()), vec!["Gardening tips"]);
            }

            #[tokio::test]
            async fn test_rest_list_filter_pattern() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(&server, &[("filter", json!({"title": "RUST"}).to_string())]).await;

                assert_eq!(response.header(CONTENT_RANGE), "0-1000/1");
                assert_eq!(titles(&response.json()), vec!["Rust ownership"]);
            }

            #[tokio::test]
            async fn test_rest_list_filter_full_text() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(&server, &[("filter", json!({"q": "widget"}).to_string())]).await;

                assert_eq!(titles(&response.json()), vec!["Async widget patterns"]);
            }

            #[tokio::test]
            async fn test_rest_list_filter_array() {
                let server = make_server().await;
                seed_posts(&server).await;

                let response = list(
                    &server,
                    &[
                        ("sort", json!(["views", "ASC"]).to_string()),
                        ("filter", json!({"title": "rust", "tags": ["garden", "async"]}).to_string()),
                    ],
                )
                .await;

                // The array filter replaces the earlier title predicate
                assert_eq!(response.header(CONTENT_RANGE), "0-1000/2");
                assert_eq!(
                    titles(&response.json()),
                    vec!["Gardening tips", "Async widget patterns"]
                );
            }

            #[tokio::test]
            async fn test_rest_list_filter_id() {
                let server = make_server().await;
                let created = seed_posts(&server).await;
                let id = created[2]["id"].as_str().unwrap();

                let response = list(&server, &[("filter", json!({"id": id}).to_string())]).await;

                let body: Value = response.json();
                assert_eq!(body.as_array().unwrap().len(), 1);
                assert_eq!(body[0]["id"], id);
            }

            // ==============================================================
            // Errors
            // ==============================================================

            #[tokio::test]
            async fn test_rest_get_unknown_returns_404() {
                let server = make_server().await;

                let response = server.get(&format!("/posts/{}", MISSING_ID)).await;

                response.assert_status(StatusCode::NOT_FOUND);
                response.assert_json(&json!({"error": "Not found"}));
            }

            #[tokio::test]
            async fn test_rest_update_unknown_returns_404() {
                let server = make_server().await;

                let response = server
                    .put(&format!("/posts/{}", MISSING_ID))
                    .json(&json!({"title": "ghost"}))
                    .await;

                response.assert_status(StatusCode::NOT_FOUND);
                let remaining = list(&server, &[]).await;
                assert_eq!(remaining.header(CONTENT_RANGE), "0-1000/0");
            }

            #[tokio::test]
            async fn test_rest_delete_unknown_returns_200() {
                let server = make_server().await;

                let response = server.delete(&format!("/posts/{}", MISSING_ID)).await;

                response.assert_status_ok();
                response.assert_json(&json!({"id": MISSING_ID}));
            }

            #[tokio::test]
            async fn test_rest_invalid_query_returns_400() {
                let server = make_server().await;

                for (key, value) in [("sort", "name"), ("range", "[0"), ("filter", "{bad")] {
                    let response = list(&server, &[(key, value.to_string())]).await;
                    response.assert_status(StatusCode::BAD_REQUEST);
                    let body: Value = response.json();
                    assert_eq!(body["param"], key);
                }
            }

            #[tokio::test]
            async fn test_rest_out_of_bounds_range_returns_400() {
                let server = make_server().await;

                let response = list(&server, &[("range", "[10,-9223372036854775808]".to_string())]).await;

                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(response.json::<Value>()["param"], "range");
            }
        }
    };
}
