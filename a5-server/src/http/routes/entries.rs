//! Entry endpoints
//!
//! Writes go to the store of record first, then to the entry index.
//! Listing is scoped to entries in the current user's blogs, newest first,
//! and paginated; search reads the index only and is paginated too.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::{created, stored_id, SearchParams};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, EntityId, ValidJson, ValidQuery};
use crate::http::server::AppState;
use crate::http::{headers, mirror};
use crate::models::{Entry, Pageable, PageableParams};

const ENTITY_NAME: &str = "entry";
const BASE_URL: &str = "/api/entries";
const SEARCH_URL: &str = "/api/_search/entries";

async fn create(state: &AppState, entry: Entry) -> Result<Response, ApiError> {
    if entry.id.is_some() {
        return Err(ApiError::id_exists(ENTITY_NAME));
    }
    entry.validate()?;

    let result = state.entries.save(&entry).await?;
    mirror::save(state.entry_index.as_ref(), &result).await?;

    let id = stored_id(ENTITY_NAME, result.id)?;
    Ok(created(ENTITY_NAME, BASE_URL, id, result))
}

/// POST /api/entries
async fn create_entry(
    State(state): State<Arc<AppState>>,
    ValidJson(entry): ValidJson<Entry>,
) -> Result<Response, ApiError> {
    tracing::debug!(?entry, "REST request to save Entry");
    create(&state, entry).await
}

/// PUT /api/entries - update an entry, or create it when it has no id
async fn update_entry(
    State(state): State<Arc<AppState>>,
    ValidJson(entry): ValidJson<Entry>,
) -> Result<Response, ApiError> {
    tracing::debug!(?entry, "REST request to update Entry");
    let Some(id) = entry.id else {
        return create(&state, entry).await;
    };
    entry.validate()?;

    let result = state.entries.update(id, &entry).await?;
    mirror::save(state.entry_index.as_ref(), &result).await?;

    let headers = headers::entity_update_alert(ENTITY_NAME, &id.to_string());
    Ok((headers, Json(result)).into_response())
}

/// GET /api/entries - a page of the current user's entries, newest first
async fn list_entries(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidQuery(params): ValidQuery<PageableParams>,
) -> Result<Response, ApiError> {
    tracing::debug!("REST request to get a page of Entries");
    let pageable = Pageable::from(params);
    let page = state
        .entries
        .find_by_blog_user_login_order_by_date_desc(user.login(), pageable)
        .await?;

    let headers = headers::pagination_headers(&page, BASE_URL);
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

/// GET /api/entries/{id} - entry with its blog and tags
async fn get_entry(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<Entry>, ApiError> {
    tracing::debug!(id, "REST request to get Entry");
    let entry = state
        .entries
        .find_one_with_eager_relationships(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: ENTITY_NAME,
            id: id.to_string(),
        })?;
    Ok(Json(entry))
}

/// DELETE /api/entries/{id} - remove from the store, then from the index
async fn delete_entry(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Response, ApiError> {
    tracing::debug!(id, "REST request to delete Entry");
    state.entries.delete(id).await?;
    mirror::delete(state.entry_index.as_ref(), id).await?;

    let headers = headers::entity_deletion_alert(ENTITY_NAME, &id.to_string());
    Ok((StatusCode::OK, headers).into_response())
}

/// GET /api/_search/entries?query= - a page of matching entries from the index
async fn search_entries(
    State(state): State<Arc<AppState>>,
    ValidQuery(search): ValidQuery<SearchParams>,
    ValidQuery(params): ValidQuery<PageableParams>,
) -> Result<Response, ApiError> {
    tracing::debug!(query = %search.query, "REST request to search for a page of Entries");
    let page = state
        .entry_index
        .search(&search.query, Some(Pageable::from(params)))
        .await?;

    let headers = headers::search_pagination_headers(&search.query, &page, SEARCH_URL);
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

/// Entry routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/entries",
            get(list_entries).post(create_entry).put(update_entry),
        )
        .route("/entries/{id}", get(get_entry).delete(delete_entry))
        .route("/_search/entries", get(search_entries))
}
