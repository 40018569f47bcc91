//! CLI module for endpoint-finder
//!
//! Provides a small command-line front end over [`Manager`].

pub mod select;
pub mod status;
pub mod watch;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::common::config::FinderConfig;
use crate::common::protocol::EndpointDocument;
use crate::common::types::EndpointMap;
use crate::error::{FinderError, FinderResult};
use crate::manager::Manager;

/// endpoint-finder - pick a healthy endpoint for a logical service key
#[derive(Parser, Debug)]
#[command(name = "endpoint-finder")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    ENDPOINT_FINDER_CONFIG                       Config file path (.toml/.json/.yaml)
    ENDPOINT_FINDER_CONFIG_URL                   Remote endpoint config URL
    ENDPOINT_FINDER_FETCH_INTERVAL_SECS          Remote fetch interval (default: 1800)
    ENDPOINT_FINDER_FETCH_TIMEOUT_SECS           Remote fetch timeout (default: 10)
    ENDPOINT_FINDER_HEALTH_CHECK_INTERVAL_SECS   Health check interval (default: 600)
    ENDPOINT_FINDER_PROBE_TIMEOUT_SECS           TCP/UDP probe timeout (default: 10)
    ENDPOINT_FINDER_HEALTH_CHECK_WORKERS         Concurrent probes per sweep (default: 32)
    ENDPOINT_FINDER_LOG_LEVEL                    Log level (default: info)
"#)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true, env = "ENDPOINT_FINDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select one endpoint and print it with the observed public IP
    Select(select::SelectArgs),
    /// Keep the manager running and print a selection periodically
    Watch(watch::WatchArgs),
    /// Print every endpoint with its health flag
    Status(status::StatusArgs),
}

/// Where endpoints come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Local seed, `KEY=ADDR[,ADDR...]` (repeatable)
    #[arg(long = "seed", value_name = "KEY=ADDRS")]
    pub seeds: Vec<String>,

    /// JSON file with seeds in the remote config format
    #[arg(long, value_name = "FILE")]
    pub seeds_file: Option<PathBuf>,

    /// Remote endpoint config URL (overrides the config file)
    #[arg(long)]
    pub url: Option<String>,
}

impl SourceArgs {
    /// Collect seeds from the file and the `--seed` arguments.
    pub fn seed_map(&self) -> FinderResult<EndpointMap> {
        let mut map = match &self.seeds_file {
            Some(path) => {
                let body = std::fs::read(path)?;
                EndpointDocument::from_slice(&body)?.into_endpoint_map()
            }
            None => EndpointMap::new(),
        };

        for seed in &self.seeds {
            let (key, addrs) = parse_seed(seed)?;
            map.entry(key).or_default().extend(addrs);
        }

        Ok(map)
    }

    /// Load configuration and start a manager.
    pub async fn start_manager(
        &self,
        config_path: Option<&Path>,
        cancel: &CancellationToken,
    ) -> FinderResult<Manager> {
        let mut config = FinderConfig::load(config_path)?;
        if let Some(url) = &self.url {
            config.config_url = Some(url.clone());
        }

        Manager::with_config(cancel, self.seed_map()?, &config).await
    }
}

/// Parse `KEY=ADDR[,ADDR...]`. The key may itself contain `=`.
pub fn parse_seed(seed: &str) -> FinderResult<(String, Vec<String>)> {
    let (key, addrs) = seed
        .rsplit_once('=')
        .ok_or_else(|| FinderError::InvalidSeed(format!("missing '=' in {:?}", seed)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(FinderError::InvalidSeed(format!("empty key in {:?}", seed)));
    }

    let addrs: Vec<String> = addrs
        .split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect();

    Ok((key.to_string(), addrs))
}

/// Run the selected subcommand.
pub async fn execute(cli: Cli) -> FinderResult<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Select(args) => select::execute(&args, config).await,
        Commands::Watch(args) => watch::execute(&args, config).await,
        Commands::Status(args) => status::execute(&args, config).await,
    }
}
