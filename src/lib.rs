//! # Simple REST
//!
//! A generic CRUD-over-HTTP adapter that exposes any data store through the
//! "simple REST" convention used by admin frontends: list, get, create,
//! update and delete, with sorting, pagination and filtering carried as
//! JSON-encoded query parameters.
//!
//! ## Features
//!
//! - **Query Compilation**: `sort`, `range` and `filter` parameters become a typed query descriptor
//! - **Store-Agnostic**: any backend implementing `ResourceStore` can be exposed
//! - **Pagination Headers**: `Content-Range: start-end/total` on every list response
//! - **Stable Identifiers**: the store's identifier field is always exposed as `id`
//! - **Configuration-Based**: resources can be declared in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use simple_rest::prelude::*;
//!
//! let app = ResourceRouter::new(InMemoryStore::new())
//!     .route("/posts")
//!     .select("title body author")
//!     .bind(Router::new());
//!
//! // GET /posts?sort=["title","ASC"]&range=[0,9]&filter={"q":"rust"}
//! // → 200 [{"id": "...", "title": "..."}], Content-Range: 0-9/42
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ArrayFilterMode, FilterCompiler, ListParams, Predicate, Projection, QueryDescriptor,
        Record, ResourceStore, RestError, SortDirection,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoStore;

    // === Config ===
    pub use crate::config::ResourceConfig;

    // === Server ===
    pub use crate::server::{Action, ResourceRouter};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::Router;
}
