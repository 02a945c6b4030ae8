mod common;

use anyhow::Result;
use std::collections::HashMap;

use options_portfolio_engine::engine::PortfolioEngine;
use options_portfolio_engine::ensemble::{JsonFileStore, PortfolioContext};
use options_portfolio_engine::models::{MarketSnapshot, Position};
use options_portfolio_engine::provider::{MarketDataProvider, StaticProvider};
use options_portfolio_engine::risk::{RiskAssessment, RiskLevel};

use common::{candidate, high_vol_market, position, test_config};

#[test]
fn full_risk_and_ensemble_pipeline() {
    let cfg = test_config();
    let engine = PortfolioEngine::new(&cfg);

    // 1. Risk assessment over a concentrated, partly-expiring book
    let mut sofi = position("SOFI", "Financial", "Bull Call Spread", 10_000.0, 5);
    sofi.unrealized_pnl = -900.0;
    let positions = vec![
        sofi,
        position("ALLY", "Financial", "Iron Condor", 15_000.0, 20),
        position("NVDA", "Technology", "Long Straddle", 8_000.0, 45),
    ];

    let assessment = engine.assess_portfolio_risk(&positions, Some(100_000.0));
    assert!(assessment.overall_risk_score > 0);
    assert_ne!(assessment.risk_level, RiskLevel::None);
    assert!(assessment
        .alerts
        .iter()
        .any(|a| a.code == "SECTOR_CONCENTRATION"));
    assert!(assessment
        .alerts
        .iter()
        .any(|a| a.code == "EXPIRING_POSITIONS"));
    let sofi_risk = &assessment.position_risks[0];
    assert!(sofi_risk.factors.iter().any(|f| f.code == "CRITICAL_TIME_DECAY"));
    assert!(sofi_risk.factors.iter().any(|f| f.code == "APPROACHING_MAX_LOSS"));
    assert!(sofi_risk.risk_score >= 65.0);

    // Greeks picked up the call-bearing strategy name
    assert!(assessment.greeks.total_vega > 0.0);

    // 2. Ensemble pass over a high-IV market
    let market = high_vol_market(&["SPY", "QQQ", "IWM", "SOFI", "NVDA", "AMD"]);
    let candidates = vec![
        candidate("Iron Condor", "SPY", 72.0),
        candidate("Bull Put Credit Spread", "QQQ", 68.0),
        candidate("Bull Call Spread", "SOFI", 80.0),
        candidate("Long Straddle", "NVDA", 75.0),
        candidate("Calendar Spread", "TSLA", 62.0),
        candidate("Momentum Breakout Call", "PLTR", 83.0),
    ];
    let context = PortfolioContext {
        active_trades: positions.clone(),
    };

    let result = engine.generate_ensemble_recommendations(&market, &candidates, &context);

    assert_eq!(result.market_regime.primary, "high_volatility");
    let weight_sum: f64 = result.ensemble_weights.values().sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);
    assert!(!result.recommendations.is_empty());
    for rec in &result.recommendations {
        assert!((0.0..=100.0).contains(&rec.ensemble_score));
        assert!(rec.portfolio_allocation >= 0.0);
    }

    // 3. JSON round-trip of the assessment
    let json = serde_json::to_string(&assessment).unwrap();
    let back: RiskAssessment = serde_json::from_str(&json).unwrap();
    assert_eq!(back.overall_risk_score, assessment.overall_risk_score);
    assert_eq!(back.alerts.len(), assessment.alerts.len());
}

#[test]
fn recorded_performance_shifts_weights_and_persists() {
    let cfg = test_config();
    let store_path = std::env::temp_dir().join(format!(
        "ope_integ_perf_{}_{}.json",
        std::process::id(),
        std::thread::current().name().unwrap_or("t").len()
    ));
    let _ = std::fs::remove_file(&store_path);

    let market = high_vol_market(&["SPY", "QQQ", "IWM"]);
    let baseline_weight = {
        let engine = PortfolioEngine::new(&cfg);
        let r = engine.generate_ensemble_recommendations(
            &market,
            &[],
            &PortfolioContext::default(),
        );
        r.ensemble_weights["rangeBoundIncome"]
    };

    {
        let engine =
            PortfolioEngine::with_store(&cfg, Box::new(JsonFileStore::at(store_path.clone())));
        for _ in 0..4 {
            engine.record_strategy_performance("Iron Condor", true, 12.5);
        }
        let r = engine.generate_ensemble_recommendations(
            &market,
            &[],
            &PortfolioContext::default(),
        );
        assert!(r.ensemble_weights["rangeBoundIncome"] > baseline_weight);
    }

    // A fresh engine restores the counters from the store
    let engine = PortfolioEngine::with_store(&cfg, Box::new(JsonFileStore::at(store_path.clone())));
    let r = engine.generate_ensemble_recommendations(&market, &[], &PortfolioContext::default());
    assert!(r.ensemble_weights["rangeBoundIncome"] > baseline_weight);

    let _ = std::fs::remove_file(&store_path);
}

#[test]
fn empty_portfolio_assessment_is_clean() {
    let cfg = test_config();
    let engine = PortfolioEngine::new(&cfg);
    let assessment = engine.assess_portfolio_risk(&[], None);
    assert_eq!(assessment.risk_level, RiskLevel::None);
    assert_eq!(assessment.overall_risk_score, 0);
    assert!(assessment.alerts.is_empty());
    assert!(assessment.recommendations.is_empty());
}

#[tokio::test]
async fn static_provider_feeds_the_engine() -> Result<()> {
    let cfg = test_config();
    let engine = PortfolioEngine::new(&cfg);

    let mut snapshots = HashMap::new();
    for sym in ["SPY", "QQQ", "IWM", "SOFI"] {
        snapshots.insert(
            sym.to_string(),
            MarketSnapshot {
                price: 420.0,
                change_percent: 2.0,
                implied_volatility: Some(0.25),
                volume: 3_000_000.0,
                avg_volume: 1_000_000.0,
                holy_grail: 70.0,
            },
        );
    }
    let mut provider = StaticProvider::new(snapshots);

    let symbols: Vec<String> = ["SPY", "QQQ", "IWM", "SOFI", "MISSING"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let market = provider.fetch_snapshots(&symbols).await?;
    assert_eq!(market.len(), 4);

    let result =
        engine.generate_ensemble_recommendations(&market, &[], &PortfolioContext::default());
    // Broad rally with volume and squeeze setups across the board
    assert_eq!(result.market_regime.primary, "momentum_breakout");
    assert_eq!(result.market_regime.metrics.squeeze_count, 4);
    Ok(())
}

#[test]
fn malformed_positions_are_defaulted_not_rejected() {
    let raw = r#"[
        {"symbol": "SOFI"},
        {"symbol": "PLTR", "strategyName": "Iron Condor", "positionSize": 5000}
    ]"#;
    let positions: Vec<Position> = serde_json::from_str(raw).unwrap();

    let cfg = test_config();
    let engine = PortfolioEngine::new(&cfg);
    let assessment = engine.assess_portfolio_risk(&positions, None);

    // No panics, defaults applied: missing sector buckets as Unknown
    assert!(assessment.concentration.by_sector.contains_key("Unknown"));
    assert_eq!(assessment.position_risks.len(), 2);
}
