//! Blog endpoints
//!
//! Writes go to the store of record first, then to the blog index.
//! Listing is scoped to the current user and unpaginated; search reads the
//! index only and is unpaginated as well.
//!
//! Renaming a blog does not touch the entry index: entry documents keep the
//! old name in their `blog` field and stored JSON until `a5 reindex` runs.

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
use crate::models::Blog;

const ENTITY_NAME: &str = "blog";
const BASE_URL: &str = "/api/blogs";

async fn create(state: &AppState, user: &CurrentUser, blog: Blog) -> Result<Response, ApiError> {
    if blog.id.is_some() {
        return Err(ApiError::id_exists(ENTITY_NAME));
    }
    blog.validate()?;

    let result = state.blogs.save(&blog, user.login()).await?;
    mirror::save(state.blog_index.as_ref(), &result).await?;

    let id = stored_id(ENTITY_NAME, result.id)?;
    Ok(created(ENTITY_NAME, BASE_URL, id, result))
}

/// POST /api/blogs - create a blog owned by the current user
async fn create_blog(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidJson(blog): ValidJson<Blog>,
) -> Result<Response, ApiError> {
    tracing::debug!(?blog, "REST request to save Blog");
    create(&state, &user, blog).await
}

/// PUT /api/blogs - update a blog, or create it when it has no id
async fn update_blog(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidJson(blog): ValidJson<Blog>,
) -> Result<Response, ApiError> {
    tracing::debug!(?blog, "REST request to update Blog");
    let Some(id) = blog.id else {
        return create(&state, &user, blog).await;
    };
    blog.validate()?;

    let result = state.blogs.update(id, &blog).await?;
    mirror::save(state.blog_index.as_ref(), &result).await?;

    let headers = headers::entity_update_alert(ENTITY_NAME, &id.to_string());
    Ok((headers, Json(result)).into_response())
}

/// GET /api/blogs - blogs owned by the current user
async fn list_blogs(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Blog>>, ApiError> {
    tracing::debug!("REST request to get all Blogs");
    let blogs = state.blogs.find_by_user_is_current_user(user.login()).await?;
    Ok(Json(blogs))
}

/// GET /api/blogs/{id}
async fn get_blog(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<Blog>, ApiError> {
    tracing::debug!(id, "REST request to get Blog");
    let blog = state.blogs.find_one(id).await?.ok_or_else(|| ApiError::NotFound {
        resource: ENTITY_NAME,
        id: id.to_string(),
    })?;
    Ok(Json(blog))
}

/// DELETE /api/blogs/{id} - remove from the store, then from the index
async fn delete_blog(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Response, ApiError> {
    tracing::debug!(id, "REST request to delete Blog");
    state.blogs.delete(id).await?;
    mirror::delete(state.blog_index.as_ref(), id).await?;

    let headers = headers::entity_deletion_alert(ENTITY_NAME, &id.to_string());
    Ok((StatusCode::OK, headers).into_response())
}

/// GET /api/_search/blogs?query= - every matching blog from the index
async fn search_blogs(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<SearchParams>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    tracing::debug!(query = %params.query, "REST request to search Blogs");
    let page = state.blog_index.search(&params.query, None).await?;
    Ok(Json(page.content))
}

/// Blog routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/blogs",
            get(list_blogs).post(create_blog).put(update_blog),
        )
        .route("/blogs/{id}", get(get_blog).delete(delete_blog))
        .route("/_search/blogs", get(search_blogs))
}
