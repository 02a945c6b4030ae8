use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use options_portfolio_engine::config::Config;
use options_portfolio_engine::engine::PortfolioEngine;
use options_portfolio_engine::models::Position;

/// One-shot risk assessment over a positions JSON file.
///
/// Usage: assess <positions.json> [portfolio_value]
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let path = args
        .get(1)
        .context("Usage: assess <positions.json> [portfolio_value]")?;

    let portfolio_value: Option<f64> = args.get(2).and_then(|s| s.parse().ok());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path))?;
    let positions: Vec<Position> =
        serde_json::from_str(&content).context("Failed to parse positions JSON")?;

    let engine = PortfolioEngine::new(&cfg);
    let assessment = engine.assess_portfolio_risk(&positions, portfolio_value);

    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}
