//! HTTP server command

use std::net::SocketAddr;
use std::sync::Arc;

use a5_server::http::{run_server, AppState, ServerConfig, DEFAULT_USER_HEADER};
use anyhow::{Context, Result};
use axum::http::HeaderName;
use clap::Parser;

use super::{Backend, BackendArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[arg(long, short = 'b', env = "A5_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Header carrying the authenticated user's login
    #[arg(long, env = "A5_USER_HEADER")]
    pub user_header: Option<String>,

    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.backend.load_config()?;
    let defaults = ServerConfig::default();

    let bind_addr = args.bind.or(config.server.bind).unwrap_or(defaults.bind_addr);
    let cors_permissive = args.cors_permissive || config.server.cors_permissive.unwrap_or(false);
    let user_header = args
        .user_header
        .or_else(|| config.server.user_header.clone())
        .unwrap_or_else(|| DEFAULT_USER_HEADER.to_string());
    let user_header = HeaderName::try_from(user_header.to_ascii_lowercase())
        .with_context(|| format!("Invalid user header name: {user_header}"))?;

    tracing::info!("Starting a5 server on {}", bind_addr);

    let backend = Backend::open(&args.backend, &config).await?;
    let state = AppState {
        blogs: backend.blogs,
        entries: backend.entries,
        blog_index: backend.blog_index,
        entry_index: backend.entry_index,
        user_header,
    };

    let server_config = ServerConfig {
        bind_addr,
        cors_permissive,
    };

    // Blocks until shutdown
    run_server(Arc::new(state), server_config)
        .await
        .context("Server error")?;

    Ok(())
}
