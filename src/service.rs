use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use options_portfolio_engine::config::SharedConfig;
use options_portfolio_engine::engine::PortfolioEngine;
use options_portfolio_engine::ensemble::PortfolioContext;
use options_portfolio_engine::provider::MarketDataProvider;

/// Periodic scan loop: fetch snapshots, classify the regime, run a weighting
/// pass, and log the resulting allocation.
pub struct ScanService {
    config: SharedConfig,
    engine: PortfolioEngine,
    provider: Box<dyn MarketDataProvider>,
}

impl ScanService {
    pub fn new(
        config: SharedConfig,
        engine: PortfolioEngine,
        provider: Box<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            config,
            engine,
            provider,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let (watchlist, interval) = {
            let cfg = self.config.read().await;
            (cfg.watchlist.clone(), cfg.scan_interval)
        };

        info!("{}", "=".repeat(60));
        info!("Options portfolio engine starting up");
        info!("Watchlist: {}", watchlist.join(", "));
        info!("Scan interval: {}s", interval);
        info!("{}", "=".repeat(60));

        loop {
            self.run_cycle(&watchlist).await;
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    async fn run_cycle(&mut self, watchlist: &[String]) {
        let market = match self.provider.fetch_snapshots(watchlist).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Snapshot fetch failed, skipping cycle: {}", e);
                return;
            }
        };

        let result = self.engine.generate_ensemble_recommendations(
            &market,
            &[],
            &PortfolioContext::default(),
        );

        info!(
            "Regime: {} ({:.0}% confidence) | avgIV {:.2} | avgChange {:+.2}%",
            result.market_regime.primary,
            result.market_regime.confidence,
            result.market_regime.metrics.avg_iv,
            result.market_regime.metrics.avg_change_percent,
        );
        for (group, weight) in &result.ensemble_weights {
            info!("  {}: {:.1}%", group, weight * 100.0);
        }
    }
}
