//! Search index - the full-text replica of blogs and entries
//!
//! ```text
//! resource write ──► store of record ──► SearchRepository::save / delete
//! resource search ─────────────────────► SearchRepository::search
//! ```
//!
//! Each entity type gets its own tantivy index directory. Documents keep the
//! entity's JSON in a stored field, so search results come back as full
//! entities without touching the store. Query strings are handed to
//! tantivy's `QueryParser` as-is.

mod document;
mod index;

use async_trait::async_trait;

pub use document::Indexable;
pub use index::{TantivySearchRepository, DEFAULT_WRITER_MEMORY};

use crate::models::{Page, Pageable};

pub type SearchResult<T> = Result<T, SearchError>;

/// Search index error type
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("index error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("cannot open index directory: {0}")]
    OpenDirectory(#[from] tantivy::directory::error::OpenDirectoryError),

    /// The query string is not valid query syntax
    #[error("invalid query: {0}")]
    Query(#[from] tantivy::query::QueryParserError),

    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{index} document has no id")]
    MissingId { index: &'static str },

    #[error("stored document is missing its source")]
    MissingSource,
}

/// Full-text replica of one entity type
#[async_trait]
pub trait SearchRepository<T>: Send + Sync {
    /// Index `entity`, replacing any document with the same id.
    async fn save(&self, entity: &T) -> SearchResult<()>;

    /// Remove the document with this id; absent documents are ignored.
    async fn delete(&self, id: i64) -> SearchResult<()>;

    /// Run a free-text query. `None` returns every hit in one page.
    async fn search(&self, query: &str, pageable: Option<Pageable>) -> SearchResult<Page<T>>;

    /// Remove every document.
    async fn clear(&self) -> SearchResult<()>;
}
