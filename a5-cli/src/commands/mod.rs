//! Subcommands and the backend wiring they share

pub mod reindex;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use a5_server::db::{create_pool_with_options, pool::DEFAULT_MAX_CONNECTIONS, schema};
use a5_server::db::{PgBlogRepo, PgEntryRepo};
use a5_server::models::{Blog, Entry};
use a5_server::search::{TantivySearchRepository, DEFAULT_WRITER_MEMORY};
use anyhow::{Context, Result};
use clap::Args;

use crate::config::A5Config;

/// Store and index options shared by `serve` and `reindex`
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Config file (default: ~/.a5/config.toml)
    #[arg(long, env = "A5_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum database connections
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Directory holding the search indexes (default: ~/.a5/index)
    #[arg(long, env = "A5_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,
}

impl BackendArgs {
    pub fn load_config(&self) -> Result<A5Config> {
        let path = self.config.clone().unwrap_or_else(A5Config::config_path);
        A5Config::load_from(&path)
    }
}

/// Store of record plus both search indexes
pub struct Backend {
    pub blogs: Arc<PgBlogRepo>,
    pub entries: Arc<PgEntryRepo>,
    pub blog_index: Arc<TantivySearchRepository<Blog>>,
    pub entry_index: Arc<TantivySearchRepository<Entry>>,
}

impl Backend {
    /// Connect to the database, bootstrap the schema and open the indexes.
    pub async fn open(args: &BackendArgs, config: &A5Config) -> Result<Self> {
        let database_url = args
            .database_url
            .clone()
            .or_else(|| config.database.url.clone())
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, ~/.a5/.env or ~/.a5/config.toml")?;
        let max_connections = args
            .max_connections
            .or(config.database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let pool = create_pool_with_options(&database_url, max_connections)
            .await
            .context("Failed to create database pool")?;
        schema::bootstrap(&pool)
            .await
            .context("Failed to bootstrap database schema")?;

        let index_dir = args
            .index_dir
            .clone()
            .or_else(|| config.search.index_dir.clone())
            .unwrap_or_else(A5Config::default_index_dir);
        let writer_memory = config.search.writer_memory.unwrap_or(DEFAULT_WRITER_MEMORY);

        let blog_index = TantivySearchRepository::<Blog>::open(&index_dir, writer_memory)
            .context("Failed to open blog index")?;
        let entry_index = TantivySearchRepository::<Entry>::open(&index_dir, writer_memory)
            .context("Failed to open entry index")?;

        Ok(Self {
            blogs: Arc::new(PgBlogRepo::new(pool.clone())),
            entries: Arc::new(PgEntryRepo::new(pool)),
            blog_index: Arc::new(blog_index),
            entry_index: Arc::new(entry_index),
        })
    }
}
