//! File configuration: `~/.a5/config.toml`
//!
//! Every value is optional. Command-line flags and environment variables
//! take precedence over the file, and the file over built-in defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Contents of the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A5Config {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub search: SearchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
    pub cors_permissive: Option<bool>,
    pub user_header: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub index_dir: Option<PathBuf>,
    pub writer_memory: Option<usize>,
}

impl A5Config {
    /// Config directory: ~/.a5
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".a5")
    }

    /// Default config file path: ~/.a5/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Default index root: ~/.a5/index
    pub fn default_index_dir() -> PathBuf {
        Self::config_dir().join("index")
    }

    /// Load the file at `path`, or defaults when it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file (invalid TOML): {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the config file contents as parsed (defaults when absent)
    Show {
        /// Config file to read instead of ~/.a5/config.toml
        #[arg(long, env = "A5_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", A5Config::config_path().display());
        }
        ConfigCommands::Show { config } => {
            let path = config.unwrap_or_else(A5Config::config_path);
            let config = A5Config::load_from(&path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
