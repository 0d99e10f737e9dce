//! dclean — find and clean up large, old, temporary, empty and duplicate files.
//!
//! This binary parses the command line, loads configuration, sets up
//! logging on stderr and hands off to the subcommand in [`commands`].

mod background;
mod cli;
mod commands;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dclean_core::{Config, CoreError};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Scan(args) => commands::scan(args, config).await,
        Command::Clean(args) => commands::clean(args, config).await,
        Command::Delete(args) => commands::delete(args, config).await,
    }
}

/// Returns the path of the per-user config file (`~/.config/dclean/config.toml`).
fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("dclean")
            .join("config.toml")
    })
}

/// Loads `explicit` if given, else the per-user file if it exists, else defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let Some(path) = user_config_path() else {
        return Ok(Config::default());
    };
    match Config::load(&path) {
        Ok(config) => {
            tracing::debug!("loaded config from {}", path.display());
            Ok(config)
        }
        Err(CoreError::NotFound(_)) => Ok(Config::default()),
        Err(e) => Err(e).with_context(|| format!("failed to load config {}", path.display())),
    }
}
