//! Rebuild the search indexes from the database

use a5_server::reindex::reindex_all;
use anyhow::{Context, Result};
use clap::Parser;

use super::{Backend, BackendArgs};

/// Arguments for the reindex command
#[derive(Parser, Debug)]
pub struct ReindexArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Clear both indexes and write every blog and entry from the database.
///
/// Run it while the server is stopped: the server holds the index writer lock.
pub async fn run_reindex(args: ReindexArgs) -> Result<()> {
    let config = args.backend.load_config()?;
    let backend = Backend::open(&args.backend, &config).await?;

    let stats = reindex_all(
        backend.blogs.as_ref(),
        backend.entries.as_ref(),
        backend.blog_index.as_ref(),
        backend.entry_index.as_ref(),
    )
    .await
    .context("Reindex failed")?;

    println!("Reindexed {} blogs and {} entries", stats.blogs, stats.entries);
    Ok(())
}
