//! endpoint-finder Entry Point

use clap::Parser;
use endpoint_finder::cli::{self, Cli};
use endpoint_finder::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init().expect("failed to initialize logging");

    if let Err(e) = cli::execute(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
