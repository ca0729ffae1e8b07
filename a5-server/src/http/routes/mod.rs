//! Route handlers organized by resource

pub mod blogs;
pub mod entries;
pub mod health;

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::headers;

/// `?query=` parameter of the search endpoints
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// Id of an entity the store just returned.
fn stored_id(entity: &'static str, id: Option<i64>) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::Internal {
        message: format!("store returned a {entity} without an id"),
    })
}

/// 201 with `Location` and creation alert headers.
fn created<T: serde::Serialize>(entity: &str, base_url: &str, id: i64, body: T) -> Response {
    let mut headers = headers::entity_creation_alert(entity, &id.to_string());
    if let Ok(location) = HeaderValue::from_str(&format!("{base_url}/{id}")) {
        headers.insert(LOCATION, location);
    }
    (StatusCode::CREATED, headers, Json(body)).into_response()
}
