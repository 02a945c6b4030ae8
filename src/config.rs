use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedConfig = Arc<RwLock<Config>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Market data
    pub fmp_base_url: String,
    pub fmp_api_key: String,
    pub watchlist: Vec<String>,
    pub scan_interval: u64,

    // Risk scoring
    pub default_portfolio_value: f64,
    pub sector_concentration_threshold: f64,
    pub critical_dte: i64,
    pub oversized_position_fraction: f64,
    pub max_loss_pnl_threshold: f64,

    // Ensemble weighting
    pub min_group_weight: f64,
    pub max_group_weight: f64,
    pub min_trades_for_performance: u64,
    pub rebalance_drift_threshold: f64,

    // Logging
    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let watchlist = env("WATCHLIST", "SPY,QQQ,IWM,SOFI,PLTR,AMD,NVDA,TSLA")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            fmp_base_url: env("FMP_BASE_URL", "https://financialmodelingprep.com"),
            fmp_api_key: env("FMP_API_KEY", ""),
            watchlist,
            scan_interval: env("SCAN_INTERVAL", "60").parse().unwrap_or(60),
            default_portfolio_value: env("PORTFOLIO_VALUE", "100000")
                .parse()
                .unwrap_or(100_000.0),
            sector_concentration_threshold: 0.35,
            critical_dte: 7,
            oversized_position_fraction: 0.15,
            max_loss_pnl_threshold: -800.0,
            min_group_weight: 0.05,
            max_group_weight: 0.40,
            min_trades_for_performance: 3,
            rebalance_drift_threshold: 0.15,
            log_dir: env("LOG_DIR", "logs"),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}
