//! ResourceStore contract test macro.
//!
//! The `resource_store_tests!` macro exercises a backend directly, without
//! HTTP, against the contract the handlers rely on.

/// Generate a `ResourceStore` contract suite for a storage backend.
///
/// `$store_factory` must produce an empty `impl ResourceStore`.
#[macro_export]
macro_rules! resource_store_tests {
    ($store_factory:expr) => {
        mod resource_store_tests {
            use super::*;
            use serde_json::{Value, json};
            use simple_rest::core::query::compile;
            use simple_rest::core::{Predicate, Projection, ResourceStore};

            fn by_id(store: &impl ResourceStore, id: &Value) -> Vec<Predicate> {
                vec![Predicate::Equals {
                    field: store.identifier_field().to_string(),
                    value: id.clone(),
                }]
            }

            async fn seeded() -> (impl ResourceStore, Vec<Value>) {
                let store = $store_factory;
                let mut ids = Vec::new();
                for post in sample_posts() {
                    let created = store.create(record(post)).await.unwrap();
                    ids.push(created[store.identifier_field()].clone());
                }
                (store, ids)
            }

            #[tokio::test]
            async fn test_create_assigns_identifier() {
                let store = $store_factory;

                let created = store.create(record(json!({"title": "x"}))).await.unwrap();

                let id = created[store.identifier_field()].as_str().unwrap();
                assert!(simple_rest::core::is_object_id(id));
                assert_eq!(created["title"], "x");
            }

            #[tokio::test]
            async fn test_find_one_with_projection() {
                let (store, ids) = seeded().await;

                let found = store
                    .find_one(&by_id(&store, &ids[0]), &Projection::parse("title"))
                    .await
                    .unwrap()
                    .expect("record should exist");

                assert_eq!(found["title"], "Rust ownership");
                assert_eq!(found[store.identifier_field()], ids[0]);
                assert!(!found.contains_key("views"));
            }

            #[tokio::test]
            async fn test_find_one_missing() {
                let (store, _) = seeded().await;

                let found = store
                    .find_one(
                        &by_id(&store, &json!("0000000000000000000000ff")),
                        &Projection::all(),
                    )
                    .await
                    .unwrap();

                assert!(found.is_none());
            }

            #[tokio::test]
            async fn test_find_sorts_and_windows() {
                let (store, _) = seeded().await;
                let query = compile(Some(r#"["views","DESC"]"#), Some("[0,2]"), None).unwrap();

                let found = store.find(&query, &Projection::all()).await.unwrap();

                let views: Vec<i64> = found.iter().map(|r| r["views"].as_i64().unwrap()).collect();
                assert_eq!(views, vec![30, 20]);
            }

            #[tokio::test]
            async fn test_count_ignores_window() {
                let (store, _) = seeded().await;
                let query = compile(None, Some("[0,1]"), Some(r#"{"tags":["rust"]}"#)).unwrap();

                assert_eq!(store.find(&query, &Projection::all()).await.unwrap().len(), 1);
                assert_eq!(store.count(&query.predicates).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_save_keeps_unprojected_fields() {
                let (store, ids) = seeded().await;
                let predicates = by_id(&store, &ids[2]);

                let mut partial = store
                    .find_one(&predicates, &Projection::parse("title"))
                    .await
                    .unwrap()
                    .unwrap();
                partial.insert("title".to_string(), json!("Winter gardening"));
                store.save(partial).await.unwrap();

                let stored = store
                    .find_one(&predicates, &Projection::all())
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(stored["title"], "Winter gardening");
                assert_eq!(stored["views"], 20);
            }

            #[tokio::test]
            async fn test_delete_one() {
                let (store, ids) = seeded().await;

                store.delete_one(&by_id(&store, &ids[1])).await.unwrap();
                store.delete_one(&by_id(&store, &ids[1])).await.unwrap();

                assert_eq!(store.count(&[]).await.unwrap(), 2);
            }
        }
    };
}
