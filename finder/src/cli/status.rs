//! Status command implementation

use clap::Args;
use std::collections::BTreeMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::SourceArgs;
use crate::common::error::CommonError;
use crate::error::FinderResult;
use crate::registry::EndpointState;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Endpoint sources
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, config: Option<&Path>) -> FinderResult<()> {
    let cancel = CancellationToken::new();
    let manager = args.source.start_manager(config, &cancel).await?;
    let endpoints = manager.endpoints();
    manager.shutdown().await;

    if args.json {
        let json = serde_json::to_string_pretty(&endpoints).map_err(CommonError::from)?;
        println!("{}", json);
    } else {
        if let Some(url) = manager.config_url() {
            println!("Config URL: {}", url);
        }
        print!("{}", render_table(&endpoints));
    }

    Ok(())
}

/// Render endpoints as an indented plain-text listing
pub fn render_table(endpoints: &BTreeMap<String, Vec<EndpointState>>) -> String {
    if endpoints.is_empty() {
        return "No endpoints registered\n".to_string();
    }

    let mut out = String::new();
    for (key, list) in endpoints {
        out.push_str(key);
        out.push('\n');
        if list.is_empty() {
            out.push_str("  (no addresses)\n");
        }
        for endpoint in list {
            let status = if endpoint.healthy { "healthy" } else { "unhealthy" };
            out.push_str(&format!("  {:<24} {}\n", endpoint.address, status));
        }
    }
    out
}
