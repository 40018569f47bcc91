//! Select command implementation

use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::SourceArgs;
use crate::client::{Client, EndpointClient};
use crate::error::FinderResult;

/// Arguments for the select command
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Logical service key
    #[arg(long)]
    pub key: String,

    /// Endpoint sources
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute the select command
pub async fn execute(args: &SelectArgs, config: Option<&Path>) -> FinderResult<()> {
    let cancel = CancellationToken::new();
    let manager = args.source.start_manager(config, &cancel).await?;
    let client = Client::from_manager(Arc::new(manager));

    println!(
        "Selected Endpoint: {}",
        client.get_endpoint(&args.key).unwrap_or_default()
    );
    println!(
        "Client Public IP: {}",
        client.client_public_ip().unwrap_or_default()
    );

    client.manager().shutdown().await;
    Ok(())
}
