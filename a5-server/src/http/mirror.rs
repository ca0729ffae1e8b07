//! Dual write from the store of record to the search index
//!
//! The store write has already succeeded when these run. A failed index
//! write is not compensated: the store keeps the change, the failure is
//! logged with the entity and id, and the request fails with a 500.

use crate::search::{Indexable, SearchRepository};

use super::error::ApiError;

/// Mirror a saved entity into its index.
pub async fn save<T: Indexable>(index: &dyn SearchRepository<T>, entity: &T) -> Result<(), ApiError> {
    index.save(entity).await.map_err(|e| {
        tracing::error!(
            index = T::INDEX_NAME,
            id = ?entity.index_id(),
            "Search index save failed after store write: {}",
            e
        );
        ApiError::Search(e)
    })
}

/// Mirror a deletion into its index.
pub async fn delete<T: Indexable>(index: &dyn SearchRepository<T>, id: i64) -> Result<(), ApiError> {
    index.delete(id).await.map_err(|e| {
        tracing::error!(
            index = T::INDEX_NAME,
            id,
            "Search index delete failed after store delete: {}",
            e
        );
        ApiError::Search(e)
    })
}
