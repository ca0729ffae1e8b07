//! a5 CLI - blog backend with a full-text search mirror
//!
//! - `serve`: run the HTTP API (blogs, entries, search)
//! - `reindex`: rebuild the search indexes from the database
//! - `config`: inspect `~/.a5/config.toml`

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::A5Config;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "a5",
    author,
    version,
    about = "Blog backend: REST API over PostgreSQL with a tantivy search mirror"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Clear and rebuild both search indexes from the database
    Reindex(commands::reindex::ReindexArgs),
    /// Inspect a5 configuration (path, show)
    Config(config::ConfigArgs),
}

fn load_env() {
    // ~/.a5/.env first, then the working directory; existing vars win
    let global_env = A5Config::config_dir().join(".env");
    if global_env.exists() {
        dotenvy::from_path(&global_env).ok();
    }
    dotenvy::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::Reindex(args) => commands::reindex::run_reindex(args).await,
        Commands::Config(args) => config::run_config(args),
    };

    tracing_setup::shutdown_otel();
    result
}
