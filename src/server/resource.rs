//! ResourceRouter: fluent builder binding CRUD routes for one store

use super::action::{Action, RouteTarget};
use super::handlers::{ResourceSettings, ResourceState};
use crate::config::ResourceConfig;
use crate::core::query::{ArrayFilterMode, DEFAULT_LIMIT, FilterCompiler};
use crate::core::record::Projection;
use crate::core::store::ResourceStore;
use axum::Router;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, Route};
use std::convert::Infallible;
use std::sync::Arc;
use tower::{Layer, Service};

type Middleware = Box<dyn FnOnce(Router) -> Router + Send>;

/// Builder exposing a [`ResourceStore`] as a set of REST routes
///
/// | Action | Route |
/// |---|---|
/// | `GET_LIST` | `GET {route}` |
/// | `GET_ONE` | `GET {route}/{id}` |
/// | `CREATE` | `POST {route}` |
/// | `UPDATE` | `PUT {route}/{id}` |
/// | `DELETE` | `DELETE {route}/{id}` |
///
/// # Example
///
/// ```ignore
/// let app = ResourceRouter::new(InMemoryStore::new())
///     .route("/posts")
///     .select("title body -secret")
///     .layer(middleware::from_fn(require_api_key))
///     .bind(Router::new());
/// ```
pub struct ResourceRouter {
    store: Arc<dyn ResourceStore>,
    route: String,
    actions: Vec<Action>,
    select: Projection,
    identifier_field: Option<String>,
    default_limit: i64,
    array_filters: ArrayFilterMode,
    expose_content_range: bool,
    middlewares: Vec<Middleware>,
}

impl ResourceRouter {
    /// Create a builder for `store` with every action enabled
    pub fn new(store: impl ResourceStore + 'static) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Create a builder for a shared store
    pub fn from_arc(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            route: String::new(),
            actions: Action::ALL.to_vec(),
            select: Projection::all(),
            identifier_field: None,
            default_limit: DEFAULT_LIMIT,
            array_filters: ArrayFilterMode::default(),
            expose_content_range: true,
            middlewares: Vec::new(),
        }
    }

    /// Create a builder from a loaded configuration
    pub fn from_config(store: Arc<dyn ResourceStore>, config: ResourceConfig) -> Self {
        let identifier_field = config
            .identifier_field_or(store.identifier_field())
            .to_string();
        Self::from_arc(store)
            .route(config.route)
            .actions(config.actions)
            .projection(config.select)
            .identifier_field(identifier_field)
            .default_limit(config.default_limit)
            .array_filters(config.array_filters)
            .expose_content_range(config.expose_content_range)
    }

    /// Base route (e.g., "/posts"); empty mounts at the root
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Restrict the enabled actions
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    /// Field selection from a select string (`"title -secret"`)
    pub fn select(self, select: &str) -> Self {
        self.projection(Projection::parse(select))
    }

    /// Field selection applied to every read
    pub fn projection(mut self, projection: Projection) -> Self {
        self.select = projection;
        self
    }

    /// Override the store's canonical identifier field
    pub fn identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = Some(field.into());
        self
    }

    /// Limit used when a list request carries no range
    pub fn default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// How array-valued filters combine with other predicates
    pub fn array_filters(mut self, mode: ArrayFilterMode) -> Self {
        self.array_filters = mode;
        self
    }

    /// Whether list responses expose `Content-Range` to cross-origin clients
    pub fn expose_content_range(mut self, expose: bool) -> Self {
        self.expose_content_range = expose;
        self
    }

    /// Add a middleware running before the resource handlers
    ///
    /// Middlewares run in the order they are added and only wrap this
    /// resource's routes.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.middlewares
            .push(Box::new(move |router: Router| router.route_layer(layer)));
        self
    }

    /// Build a router holding only this resource's routes
    pub fn build(self) -> Router {
        let identifier_field = self
            .identifier_field
            .unwrap_or_else(|| self.store.identifier_field().to_string());
        let base = normalize_route(&self.route);

        let compiler = FilterCompiler::new(identifier_field.clone())
            .with_default_limit(self.default_limit)
            .with_array_filters(self.array_filters);

        let state = ResourceState {
            store: self.store,
            settings: Arc::new(ResourceSettings {
                route: base.clone(),
                identifier_field,
                compiler,
                projection: self.select,
                expose_content_range: self.expose_content_range,
            }),
        };

        let mut collection: Option<MethodRouter<ResourceState>> = None;
        let mut item: Option<MethodRouter<ResourceState>> = None;
        let mut bound: Vec<Action> = Vec::new();

        for action in self.actions {
            if bound.contains(&action) {
                continue;
            }
            bound.push(action);

            let slot = match action.target() {
                RouteTarget::Collection => &mut collection,
                RouteTarget::Item => &mut item,
            };
            *slot = Some(match slot.take() {
                Some(existing) => existing.merge(action.method_router()),
                None => action.method_router(),
            });
        }

        tracing::debug!(route = %base, actions = ?bound, "binding resource routes");

        if collection.is_none() && item.is_none() {
            return Router::new();
        }

        let mut router: Router<ResourceState> = Router::new();
        if let Some(collection) = collection {
            if base.is_empty() {
                router = router.route("/", collection);
            } else {
                router = router
                    .route(&base, collection.clone())
                    .route(&format!("{}/", base), collection);
            }
        }
        if let Some(item) = item {
            router = router.route(&format!("{}/{{id}}", base), item);
        }

        let mut router = router.with_state(state);
        // The last route_layer applied runs first
        for middleware in self.middlewares.into_iter().rev() {
            router = middleware(router);
        }
        router
    }

    /// Merge this resource's routes into `router`
    pub fn bind(self, router: Router) -> Router {
        router.merge(self.build())
    }
}

/// Trim trailing slashes and ensure a leading one; the root becomes ""
fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
