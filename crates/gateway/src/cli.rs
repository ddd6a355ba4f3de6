//! Command-line interface and configuration loading.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use docent_domain::config::Config;

#[derive(Debug, Parser)]
#[command(name = "docent", about = "Role-aware grounded concierge gateway")]
pub struct Cli {
    /// Path to the TOML config file. Defaults to ./docent.toml when
    /// present; built-in defaults otherwise.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the gateway (default).
    Serve,
    /// Configuration helpers.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the version.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Validate the config and report issues.
    Validate,
    /// Print the effective config as TOML.
    Show,
}

/// Default config filename looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "docent.toml";

/// Load configuration. An explicitly passed path must exist; the
/// default path is optional and falls back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("config file not found: {}", p.display());
            }
            Some(p.to_path_buf())
        }
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    };

    let config = match &path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("reading {}", p.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing {}", p.display()))?
        }
        None => {
            tracing::info!("no config file found; using built-in defaults");
            Config::default()
        }
    };

    Ok((config, path))
}
