//! Repository traits and their PostgreSQL implementations
//!
//! Handlers only see the traits, so the store can be swapped for an
//! in-memory one in tests.

pub mod blogs;
pub mod entries;

pub use blogs::{BlogRepository, PgBlogRepo};
pub use entries::{EntryRepository, PgEntryRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// A referenced row is missing or the row is still referenced
    #[error("conflict: {message}")]
    Conflict { message: String },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_foreign_key_violation() {
                return Self::Conflict {
                    message: db.message().to_owned(),
                };
            }
        }
        Self::Sqlx(e)
    }
}
