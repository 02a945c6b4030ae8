use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::config::Config;
use crate::models::{MarketSnapshot, Position, StrategyCandidate};

pub fn test_config() -> Config {
    let mut cfg = Config::from_env();
    cfg.fmp_api_key = String::new();
    cfg.log_dir = std::env::temp_dir()
        .join(format!("ope_test_{}", std::process::id()))
        .to_string_lossy()
        .to_string();
    cfg
}

pub fn position(symbol: &str, sector: &str, strategy: &str, value: f64) -> Position {
    Position {
        symbol: symbol.to_string(),
        sector: sector.to_string(),
        strategy: strategy.to_string(),
        current_value: value,
        expiration_date: None,
        unrealized_pnl: 0.0,
        max_loss: 0.0,
        liquidity_score: 50.0,
    }
}

/// Pin a position's expiration `days` from `now` (plus an hour so day math
/// does not truncate below the target).
pub fn with_dte(mut p: Position, days: i64, now: DateTime<Utc>) -> Position {
    p.expiration_date = Some(now + Duration::days(days) + Duration::hours(1));
    p
}

pub fn with_pnl(mut p: Position, pnl: f64) -> Position {
    p.unrealized_pnl = pnl;
    p
}

pub fn snapshot(iv: f64, change_percent: f64) -> MarketSnapshot {
    MarketSnapshot {
        price: 100.0,
        change_percent,
        implied_volatility: Some(iv),
        volume: 1_000_000.0,
        avg_volume: 1_000_000.0,
        holy_grail: 0.0,
    }
}

/// n identical snapshots keyed SYM0..SYMn-1.
pub fn market_of(n: usize, iv: f64, change_percent: f64) -> HashMap<String, MarketSnapshot> {
    (0..n)
        .map(|i| (format!("SYM{}", i), snapshot(iv, change_percent)))
        .collect()
}

pub fn candidate(strategy: &str, symbol: &str, ai_score: f64) -> StrategyCandidate {
    StrategyCandidate {
        strategy: strategy.to_string(),
        symbol: symbol.to_string(),
        ai_score,
        group: None,
    }
}
