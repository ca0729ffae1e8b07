//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Store and index failures are logged and answered with a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::headers;
use crate::db::repos::DbError;
use crate::models::ValidationError;
use crate::search::SearchError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Request rejected for an entity, with alert headers (400)
    BadRequestAlert {
        entity: &'static str,
        error_key: &'static str,
        message: String,
    },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// No authenticated principal on the request (401)
    Unauthorized,

    /// Referenced row missing or row still referenced (409)
    Conflict { message: String },

    /// Search query could not be parsed (400)
    InvalidQuery { message: String },

    /// Store of record failure (500, logged)
    Database(DbError),

    /// Search index failure (500, logged)
    Search(SearchError),

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    /// A new entity arrived with an id already set.
    pub fn id_exists(entity: &'static str) -> Self {
        Self::BadRequestAlert {
            entity,
            error_key: "idexists",
            message: format!("A new {entity} cannot already have an ID"),
        }
    }
}

fn internal() -> serde_json::Value {
    json!({
        "error": "internal_error",
        "message": "an internal error occurred"
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::BadRequestAlert {
                entity,
                error_key,
                message,
            } => {
                let body = json!({
                    "entityName": entity,
                    "errorKey": error_key,
                    "message": message,
                    "status": StatusCode::BAD_REQUEST.as_u16()
                });
                return (
                    StatusCode::BAD_REQUEST,
                    headers::failure_alert(entity, error_key),
                    Json(body),
                )
                    .into_response();
            }
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "authentication required"
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::InvalidQuery { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "invalid_query",
                    "message": message
                }),
            ),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, internal())
            }
            Self::Search(e) => {
                tracing::error!("Search index error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, internal())
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, internal())
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationError::InvalidFormat {
            field: "body",
            reason: rejection.body_text(),
        })
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(ValidationError::InvalidFormat {
            field: "path",
            reason: rejection.body_text(),
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationError::InvalidFormat {
            field: "query string",
            reason: rejection.body_text(),
        })
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { message } => Self::Conflict { message },
            _ => Self::Database(e),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Query(e) => Self::InvalidQuery {
                message: e.to_string(),
            },
            _ => Self::Search(e),
        }
    }
}
