mod service;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use options_portfolio_engine::config::Config;
use options_portfolio_engine::engine::PortfolioEngine;
use options_portfolio_engine::ensemble::JsonFileStore;
use options_portfolio_engine::provider::FmpClient;

use crate::service::ScanService;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let store = Box::new(JsonFileStore::new(&cfg.log_dir));
    let engine = PortfolioEngine::with_store(&cfg, store);
    let provider = Box::new(FmpClient::new(&cfg));
    let shared_config = cfg.shared();

    let mut service = ScanService::new(shared_config, engine, provider);
    service.run().await?;

    Ok(())
}
