//! HTTP handlers for resource actions
//!
//! All handlers are resource-agnostic: the store, compiler and projection
//! they work with come from [`ResourceState`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::core::query::{FilterCompiler, ListParams, Predicate};
use crate::core::record::{Projection, Record, accept_identifier, expose_identifier, merge_fields};
use crate::core::{ResourceStore, RestError};

/// Per-resource settings resolved at binding time
#[derive(Debug)]
pub struct ResourceSettings {
    pub route: String,
    pub identifier_field: String,
    pub compiler: FilterCompiler,
    pub projection: Projection,
    pub expose_content_range: bool,
}

/// State shared by the handlers of one resource
#[derive(Clone)]
pub struct ResourceState {
    pub store: Arc<dyn ResourceStore>,
    pub settings: Arc<ResourceSettings>,
}

impl ResourceState {
    fn identifier_predicate(&self, id: Value) -> Predicate {
        Predicate::Equals {
            field: self.settings.identifier_field.clone(),
            value: id,
        }
    }

    fn expose(&self, record: Record) -> Value {
        Value::Object(expose_identifier(record, &self.settings.identifier_field))
    }
}

/// List records
///
/// GET {route}?sort=[..]&range=[..]&filter={..}
///
/// Responds with a JSON array and a `Content-Range: skip-end/total` header.
pub async fn get_list(
    State(state): State<ResourceState>,
    Query(params): Query<ListParams>,
) -> Result<Response, RestError> {
    let query = state.settings.compiler.compile_params(&params)?;
    tracing::debug!(route = %state.settings.route, ?query, "listing records");

    // Independent reads; the count ignores the window
    let (records, total) = tokio::try_join!(
        state.store.find(&query, &state.settings.projection),
        state.store.count(&query.predicates),
    )?;

    let items: Vec<Value> = records
        .into_iter()
        .map(|record| state.expose(record))
        .collect();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_RANGE,
        HeaderValue::from_str(&query.content_range(total)).map_err(anyhow::Error::from)?,
    );
    if state.settings.expose_content_range {
        headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("Content-Range"),
        );
    }

    Ok((headers, Json(Value::Array(items))).into_response())
}

/// Get one record
///
/// GET {route}/{id}
pub async fn get_one(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RestError> {
    tracing::debug!(route = %state.settings.route, %id, "fetching record");

    let record = state
        .store
        .find_one(
            &[state.identifier_predicate(Value::String(id))],
            &state.settings.projection,
        )
        .await?
        .ok_or(RestError::NotFound)?;

    Ok(Json(state.expose(record)))
}

/// Create a record
///
/// POST {route}
///
/// The stored record is read back through the projection so the response
/// reflects store-side defaults.
pub async fn create(
    State(state): State<ResourceState>,
    Json(body): Json<Record>,
) -> Result<Response, RestError> {
    let field = &state.settings.identifier_field;
    let created = state.store.create(accept_identifier(body, field)).await?;

    let id = created
        .get(field)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Created record has no '{}' field", field))?;
    tracing::debug!(route = %state.settings.route, %id, "created record");

    let record = state
        .store
        .find_one(&[state.identifier_predicate(id)], &state.settings.projection)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Created record could not be read back"))?;

    Ok((StatusCode::CREATED, Json(state.expose(record))).into_response())
}

/// Update a record
///
/// PUT {route}/{id}
///
/// Body fields are shallow-assigned onto the stored record.
pub async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    Json(body): Json<Record>,
) -> Result<Json<Value>, RestError> {
    tracing::debug!(route = %state.settings.route, %id, "updating record");

    let mut record = state
        .store
        .find_one(
            &[state.identifier_predicate(Value::String(id))],
            &state.settings.projection,
        )
        .await?
        .ok_or(RestError::NotFound)?;

    merge_fields(&mut record, body, &state.settings.identifier_field);
    let saved = state.store.save(record).await?;

    Ok(Json(state.expose(saved)))
}

/// Delete a record
///
/// DELETE {route}/{id}
///
/// Always answers `{"id": id}`, whether or not a record was removed.
pub async fn delete_one(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RestError> {
    tracing::debug!(route = %state.settings.route, %id, "deleting record");

    state
        .store
        .delete_one(&[state.identifier_predicate(Value::String(id.clone()))])
        .await?;

    Ok(Json(json!({ "id": id })))
}
