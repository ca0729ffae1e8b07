//! Rebuild the search indexes from the store of record

use crate::db::repos::{BlogRepository, DbError, EntryRepository};
use crate::models::{Blog, Entry};
use crate::search::{SearchError, SearchRepository};

/// Reindex error type
#[derive(Debug, thiserror::Error)]
pub enum ReindexError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Documents written per index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexStats {
    pub blogs: usize,
    pub entries: usize,
}

/// Clear both indexes and write every blog and entry from the store.
///
/// The indexes are cleared before being refilled, so searches run during a
/// reindex can miss documents until it finishes.
pub async fn reindex_all(
    blogs: &dyn BlogRepository,
    entries: &dyn EntryRepository,
    blog_index: &dyn SearchRepository<Blog>,
    entry_index: &dyn SearchRepository<Entry>,
) -> Result<ReindexStats, ReindexError> {
    let mut stats = ReindexStats::default();

    let all_blogs = blogs.find_all().await?;
    blog_index.clear().await?;
    for blog in &all_blogs {
        blog_index.save(blog).await?;
        stats.blogs += 1;
    }
    tracing::info!(count = stats.blogs, "Reindexed blogs");

    let all_entries = entries.find_all().await?;
    entry_index.clear().await?;
    for entry in &all_entries {
        entry_index.save(entry).await?;
        stats.entries += 1;
    }
    tracing::info!(count = stats.entries, "Reindexed entries");

    Ok(stats)
}
