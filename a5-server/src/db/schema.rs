//! Schema bootstrap for the store of record
//!
//! Every statement is idempotent, so this runs on each start.

use sqlx::PgPool;

use super::DbError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        login TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blog (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        handle TEXT NOT NULL,
        user_id BIGINT REFERENCES users(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_blog_user ON blog(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS entry (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        date TIMESTAMPTZ NOT NULL,
        blog_id BIGINT REFERENCES blog(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_entry_blog_date ON entry(blog_id, date DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS tag (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS entry_tag (
        entry_id BIGINT NOT NULL REFERENCES entry(id) ON DELETE CASCADE,
        tag_id BIGINT NOT NULL REFERENCES tag(id),
        PRIMARY KEY (entry_id, tag_id)
    )
    "#,
];

/// Create tables and indexes that don't exist yet.
pub async fn bootstrap(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Bootstrapping database schema");

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
