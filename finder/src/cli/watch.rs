//! Watch command implementation
//!
//! Keeps the background loops running and prints a fresh selection every
//! period until Ctrl-C.

use clap::Args;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::SourceArgs;
use crate::error::FinderResult;

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Logical service key
    #[arg(long)]
    pub key: String,

    /// Seconds between printed selections
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub every: u64,

    /// Endpoint sources
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute the watch command
pub async fn execute(args: &WatchArgs, config: Option<&Path>) -> FinderResult<()> {
    let manager = args
        .source
        .start_manager(config, &CancellationToken::new())
        .await?;

    let cancel = manager.cancellation_token().clone();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
        signal_cancel.cancel();
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(args.every));
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                println!(
                    "{} -> {} (public ip: {})",
                    args.key,
                    manager.select_one(&args.key).as_deref().unwrap_or("<none>"),
                    manager.client_public_ip().as_deref().unwrap_or("<unknown>"),
                );
            }
        }
    }

    manager.shutdown().await;
    Ok(())
}
