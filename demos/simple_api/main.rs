//! Simple example exposing an in-memory `posts` collection
//!
//! Try it with:
//! ```text
//! curl -i 'http://127.0.0.1:3000/posts?sort=["views","DESC"]&range=[0,1]'
//! curl -i 'http://127.0.0.1:3000/posts?filter={"q":"rust"}'
//! curl -X POST -H 'content-type: application/json' -d '{"title":"Hello"}' http://127.0.0.1:3000/posts
//! ```

use axum::http::header::CONTENT_RANGE;
use serde_json::json;
use simple_rest::prelude::*;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("simple_rest=debug,tower_http=info")),
        )
        .init();

    println!("🚀 Simple REST Example\n");

    let store = InMemoryStore::new();
    for post in [
        json!({"title": "Ownership in Rust", "body": "Borrowing explained", "views": 120}),
        json!({"title": "Async Rust", "body": "Futures and executors", "views": 340}),
        json!({"title": "Gardening tips", "body": "Spring planting", "views": 45}),
    ] {
        if let serde_json::Value::Object(record) = post {
            let created = store.create(record).await?;
            println!("✅ Seeded post {}", created["_id"]);
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([CONTENT_RANGE]);

    let app = ResourceRouter::new(store)
        .route("/posts")
        .select("-secret")
        .bind(Router::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    println!("\n🌐 Listening on http://{}/posts", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
