//! intern - Quant ranker for Pump Studio

use clap::Parser;

use intern::adapters::cli::{execute, CliApp};

#[tokio::main]
async fn main() {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let result = tokio::select! {
        result = execute(app) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received, stopping");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
