//! Typed errors for resource handlers
//!
//! Every handler returns `Result<_, RestError>`; the error renders itself as
//! an HTTP response through axum's [`IntoResponse`].
//!
//! | Variant | Status | Body |
//! |---|---|---|
//! | [`RestError::NotFound`] | 404 | `{"error": "Not found"}` |
//! | [`RestError::InvalidQueryParameter`] | 400 | `{"error": "...", "param": "..."}` |
//! | [`RestError::Storage`] | 500 | `{"error": "Internal server error"}` |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the resource routes
#[derive(Debug, Error)]
pub enum RestError {
    /// The targeted record does not exist
    #[error("Not found")]
    NotFound,

    /// A `sort`, `range` or `filter` parameter could not be parsed
    #[error("Invalid query parameter '{param}': {message}")]
    InvalidQueryParameter { param: &'static str, message: String },

    /// The storage collaborator failed
    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl RestError {
    /// Build an [`RestError::InvalidQueryParameter`] from a parse error
    pub fn invalid_query(param: &'static str, err: impl std::fmt::Display) -> Self {
        RestError::InvalidQueryParameter {
            param,
            message: err.to_string(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::InvalidQueryParameter { .. } => StatusCode::BAD_REQUEST,
            RestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RestError::NotFound => json!({ "error": "Not found" }),
            RestError::InvalidQueryParameter { param, .. } => {
                tracing::warn!(error = %self, "rejected list query");
                json!({ "error": self.to_string(), "param": param })
            }
            RestError::Storage(err) => {
                tracing::error!(error = ?err, "storage collaborator failed");
                json!({ "error": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
