//! CLI for apkcache.

mod commands;
mod progress_bar;

use anyhow::Result;
use apkcache_core::config::{self, CacheConfig};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_check, run_completions, run_prune, run_status, run_sync};

/// Top-level CLI for apkcache.
#[derive(Debug, Parser)]
#[command(name = "apkcache")]
#[command(about = "Keep the latest published vendor APK in a local cache", long_about = None)]
pub struct Cli {
    /// Cache directory (overrides `cache_dir` from the config file).
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Config file to read instead of ~/.config/apkcache/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Defaults to `sync`.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the latest package if the cache is missing, corrupt or outdated.
    Sync,

    /// Show what `sync` would do without downloading.
    Check,

    /// List cached packages (no network access).
    Status {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete every cached package except the newest readable one.
    Prune,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let Some(CliCommand::Completions { shell }) = cli.command {
            return run_completions(shell, &mut Cli::command());
        }

        let cfg = cli.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command.unwrap_or(CliCommand::Sync) {
            CliCommand::Sync => run_sync(&cfg)?,
            CliCommand::Check => run_check(&cfg)?,
            CliCommand::Status { json } => run_status(&cfg, json)?,
            CliCommand::Prune => run_prune(&cfg)?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }

    /// Config from `--config` or the XDG default, with `--cache-dir` applied on top.
    fn load_config(&self) -> Result<CacheConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        if let Some(dir) = &self.cache_dir {
            cfg.cache_dir = dir.clone();
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests;
