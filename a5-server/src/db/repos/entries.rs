//! Entry repository
//!
//! Entries are always read together with their blog and tag set:
//! - eager reads aggregate tags with ARRAY_AGG (no N+1)
//! - save/update write the entry row and its tag links in one transaction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::DbError;
use crate::models::{BlogRef, Entry, Page, Pageable, TagRef};

/// Persistence gateway for entries
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert a new entry and its tag links; the store assigns the id.
    async fn save(&self, entry: &Entry) -> Result<Entry, DbError>;

    /// Overwrite an existing entry and replace its tag links.
    async fn update(&self, id: i64, entry: &Entry) -> Result<Entry, DbError>;

    /// Entry with its blog and tags loaded.
    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, DbError>;

    /// Entries in blogs owned by `login`, newest first.
    async fn find_by_blog_user_login_order_by_date_desc(
        &self,
        login: &str,
        pageable: Pageable,
    ) -> Result<Page<Entry>, DbError>;

    async fn find_all(&self) -> Result<Vec<Entry>, DbError>;

    async fn delete(&self, id: i64) -> Result<(), DbError>;
}

/// Entry row joined with blog and aggregated tags
#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    title: String,
    content: String,
    date: DateTime<Utc>,
    blog_id: Option<i64>,
    blog_name: Option<String>,
    blog_handle: Option<String>,
    tag_ids: Vec<i64>,
    tag_names: Vec<String>,
    #[sqlx(default)]
    total: i64,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        let blog = row.blog_id.map(|id| BlogRef {
            id,
            name: row.blog_name,
            handle: row.blog_handle,
        });
        let tags = row
            .tag_ids
            .into_iter()
            .zip(row.tag_names)
            .map(|(id, name)| TagRef {
                id,
                name: Some(name),
            })
            .collect();

        Self {
            id: Some(row.id),
            title: row.title,
            content: row.content,
            date: row.date,
            blog,
            tags,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        e.id, e.title, e.content, e.date, e.blog_id,
        b.name AS blog_name,
        b.handle AS blog_handle,
        COALESCE(ARRAY_AGG(t.id ORDER BY t.id) FILTER (WHERE t.id IS NOT NULL), '{}') AS tag_ids,
        COALESCE(ARRAY_AGG(t.name ORDER BY t.id) FILTER (WHERE t.id IS NOT NULL), '{}') AS tag_names
"#;

const FROM_ENTRY: &str = r#"
    FROM entry e
    LEFT JOIN blog b ON b.id = e.blog_id
    LEFT JOIN entry_tag et ON et.entry_id = e.id
    LEFT JOIN tag t ON t.id = et.tag_id
"#;

/// PostgreSQL-backed entry repository
#[derive(Debug, Clone)]
pub struct PgEntryRepo {
    pool: PgPool,
}

impl PgEntryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, id: i64) -> Result<Entry, DbError> {
        self.find_one_with_eager_relationships(id)
            .await?
            .ok_or_else(|| DbError::not_found("entry", id))
    }
}

/// Replace the tag links of an entry inside `tx`.
async fn link_tags(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: i64,
    tag_ids: &[i64],
) -> Result<(), DbError> {
    sqlx::query("DELETE FROM entry_tag WHERE entry_id = $1")
        .bind(entry_id)
        .execute(&mut **tx)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO entry_tag (entry_id, tag_id)
        SELECT $1, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(entry_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl EntryRepository for PgEntryRepo {
    async fn save(&self, entry: &Entry) -> Result<Entry, DbError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO entry (title, content, date, blog_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.date)
        .bind(entry.blog_id())
        .fetch_one(&mut *tx)
        .await?;

        link_tags(&mut tx, id, &entry.tag_ids()).await?;
        tx.commit().await?;

        self.load(id).await
    }

    async fn update(&self, id: i64, entry: &Entry) -> Result<Entry, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE entry
            SET title = $2, content = $3, date = $4, blog_id = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.date)
        .bind(entry.blog_id())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("entry", id));
        }

        link_tags(&mut tx, id, &entry.tag_ids()).await?;
        tx.commit().await?;

        self.load(id).await
    }

    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, DbError> {
        let sql = format!("{SELECT_COLUMNS} {FROM_ENTRY} WHERE e.id = $1 GROUP BY e.id, b.id");
        let row: Option<EntryRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Entry::from))
    }

    async fn find_by_blog_user_login_order_by_date_desc(
        &self,
        login: &str,
        pageable: Pageable,
    ) -> Result<Page<Entry>, DbError> {
        // COUNT(*) OVER() runs after GROUP BY, so it counts entries, not tag links
        let sql = format!(
            r#"
            {SELECT_COLUMNS}, COUNT(*) OVER() AS total
            {FROM_ENTRY}
            JOIN users u ON u.id = b.user_id
            WHERE u.login = $1
            GROUP BY e.id, b.id
            ORDER BY e.date DESC, e.id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows: Vec<EntryRow> = sqlx::query_as(&sql)
            .bind(login)
            .bind(i64::from(pageable.limit()))
            .bind(pageable.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let total = match rows.first() {
            Some(row) => row.total,
            // Past the last page the window function has no rows to report on
            None if pageable.offset() > 0 => {
                let (count,): (i64,) = sqlx::query_as(
                    r#"
                    SELECT COUNT(*)
                    FROM entry e
                    JOIN blog b ON b.id = e.blog_id
                    JOIN users u ON u.id = b.user_id
                    WHERE u.login = $1
                    "#,
                )
                .bind(login)
                .fetch_one(&self.pool)
                .await?;
                count
            }
            None => 0,
        };

        let content = rows.into_iter().map(Entry::from).collect();
        Ok(Page::new(content, total.max(0) as u64, pageable))
    }

    async fn find_all(&self) -> Result<Vec<Entry>, DbError> {
        let sql = format!("{SELECT_COLUMNS} {FROM_ENTRY} GROUP BY e.id, b.id ORDER BY e.id");
        let rows: Vec<EntryRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM entry WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("entry", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{BlogRepository, PgBlogRepo};
    use crate::db::{create_pool, schema};
    use crate::models::Blog;
    use chrono::{Duration, TimeZone};

    // Integration tests - run with DATABASE_URL set
    // cargo test -p a5-server -- --ignored

    async fn repos() -> (PgBlogRepo, PgEntryRepo) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        schema::bootstrap(&pool).await.expect("bootstrap failed");
        (PgBlogRepo::new(pool.clone()), PgEntryRepo::new(pool))
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn scoped_list_is_newest_first() {
        let (blogs, entries) = repos().await;
        let login = format!("entry-owner-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let blog = blogs.save(&Blog::new("Entries", "entries"), &login).await.unwrap();
        let blog_id = blog.id.unwrap();

        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for day in 0..3 {
            let entry = Entry::new(format!("day {day}"), "body", base + Duration::days(day))
                .in_blog(blog_id);
            entries.save(&entry).await.unwrap();
        }

        let page = entries
            .find_by_blog_user_login_order_by_date_desc(&login, Pageable::new(0, 2))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[0].title, "day 2");

        let beyond = entries
            .find_by_blog_user_login_order_by_date_desc(&login, Pageable::new(5, 2))
            .await
            .unwrap();
        assert!(beyond.content.is_empty());
        assert_eq!(beyond.total_elements, 3);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_missing_entry_is_not_found() {
        let (_, entries) = repos().await;
        let err = entries.delete(i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "entry", .. }));
    }
}
