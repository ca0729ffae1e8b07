//! Blog repository
//!
//! - save: upserts the owner row and inserts the blog in one statement
//! - scoped list: JOIN on the owner's login

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{Blog, UserRef};

/// Persistence gateway for blogs
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Insert a new blog owned by `owner_login`; the store assigns the id.
    async fn save(&self, blog: &Blog, owner_login: &str) -> Result<Blog, DbError>;

    /// Overwrite `name` and `handle` of an existing blog. Ownership is unchanged.
    async fn update(&self, id: i64, blog: &Blog) -> Result<Blog, DbError>;

    async fn find_one(&self, id: i64) -> Result<Option<Blog>, DbError>;

    /// Blogs owned by the given login.
    async fn find_by_user_is_current_user(&self, login: &str) -> Result<Vec<Blog>, DbError>;

    async fn find_all(&self) -> Result<Vec<Blog>, DbError>;

    async fn delete(&self, id: i64) -> Result<(), DbError>;
}

/// Blog row joined with its owner
#[derive(Debug, FromRow)]
struct BlogRow {
    id: i64,
    name: String,
    handle: String,
    user_id: Option<i64>,
    user_login: Option<String>,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        let user = match (row.user_id, row.user_login) {
            (Some(id), Some(login)) => Some(UserRef { id, login }),
            _ => None,
        };
        Self {
            id: Some(row.id),
            name: row.name,
            handle: row.handle,
            user,
        }
    }
}

const SELECT_BLOG: &str = r#"
    SELECT b.id, b.name, b.handle, b.user_id, u.login AS user_login
    FROM blog b
    LEFT JOIN users u ON u.id = b.user_id
"#;

/// PostgreSQL-backed blog repository
#[derive(Debug, Clone)]
pub struct PgBlogRepo {
    pool: PgPool,
}

impl PgBlogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogRepository for PgBlogRepo {
    async fn save(&self, blog: &Blog, owner_login: &str) -> Result<Blog, DbError> {
        let row: BlogRow = sqlx::query_as(
            r#"
            WITH owner AS (
                INSERT INTO users (login) VALUES ($3)
                ON CONFLICT (login) DO UPDATE SET login = EXCLUDED.login
                RETURNING id, login
            ),
            inserted AS (
                INSERT INTO blog (name, handle, user_id)
                SELECT $1, $2, owner.id FROM owner
                RETURNING id, name, handle, user_id
            )
            SELECT i.id, i.name, i.handle, o.id AS user_id, o.login AS user_login
            FROM inserted i
            JOIN owner o ON o.id = i.user_id
            "#,
        )
        .bind(&blog.name)
        .bind(&blog.handle)
        .bind(owner_login)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, blog: &Blog) -> Result<Blog, DbError> {
        let row: BlogRow = sqlx::query_as(
            r#"
            WITH updated AS (
                UPDATE blog SET name = $2, handle = $3
                WHERE id = $1
                RETURNING id, name, handle, user_id
            )
            SELECT u.id, u.name, u.handle, u.user_id, usr.login AS user_login
            FROM updated u
            LEFT JOIN users usr ON usr.id = u.user_id
            "#,
        )
        .bind(id)
        .bind(&blog.name)
        .bind(&blog.handle)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("blog", id))?;

        Ok(row.into())
    }

    async fn find_one(&self, id: i64) -> Result<Option<Blog>, DbError> {
        let sql = format!("{SELECT_BLOG} WHERE b.id = $1");
        let row: Option<BlogRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Blog::from))
    }

    async fn find_by_user_is_current_user(&self, login: &str) -> Result<Vec<Blog>, DbError> {
        let sql = format!("{SELECT_BLOG} WHERE u.login = $1 ORDER BY b.id");
        let rows: Vec<BlogRow> = sqlx::query_as(&sql)
            .bind(login)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn find_all(&self) -> Result<Vec<Blog>, DbError> {
        let sql = format!("{SELECT_BLOG} ORDER BY b.id");
        let rows: Vec<BlogRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM blog WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("blog", id));
        }
        Ok(())
    }
}
