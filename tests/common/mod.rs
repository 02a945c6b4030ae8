use chrono::{Duration, Utc};
use std::collections::HashMap;

use options_portfolio_engine::config::Config;
use options_portfolio_engine::models::{MarketSnapshot, Position, StrategyCandidate};

pub fn test_config() -> Config {
    let mut cfg = Config::from_env();
    cfg.fmp_api_key = String::new();
    cfg.log_dir = std::env::temp_dir()
        .join(format!("ope_integ_{}", std::process::id()))
        .to_string_lossy()
        .to_string();
    cfg
}

pub fn position(symbol: &str, sector: &str, strategy: &str, value: f64, dte: i64) -> Position {
    Position {
        symbol: symbol.to_string(),
        sector: sector.to_string(),
        strategy: strategy.to_string(),
        current_value: value,
        expiration_date: Some(Utc::now() + Duration::days(dte) + Duration::hours(1)),
        unrealized_pnl: 0.0,
        max_loss: 0.0,
        liquidity_score: 50.0,
    }
}

pub fn candidate(strategy: &str, symbol: &str, ai_score: f64) -> StrategyCandidate {
    StrategyCandidate {
        strategy: strategy.to_string(),
        symbol: symbol.to_string(),
        ai_score,
        group: None,
    }
}

/// A high-IV, flat-change snapshot map over `symbols`.
pub fn high_vol_market(symbols: &[&str]) -> HashMap<String, MarketSnapshot> {
    symbols
        .iter()
        .map(|s| {
            (
                s.to_string(),
                MarketSnapshot {
                    price: 100.0,
                    change_percent: 0.0,
                    implied_volatility: Some(0.5),
                    volume: 1_000_000.0,
                    avg_volume: 1_000_000.0,
                    holy_grail: 0.0,
                },
            )
        })
        .collect()
}
