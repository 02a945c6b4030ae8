use chrono::Utc;
use std::collections::HashMap;

use crate::config::Config;
use crate::ensemble::store::PerformanceStore;
use crate::ensemble::{EnsembleResult, PortfolioContext, StrategyEnsemble};
use crate::models::{MarketSnapshot, Position, StrategyCandidate};
use crate::risk::{RiskAssessment, RiskScorer};

/// Facade tying the stateless risk scorer to the stateful strategy ensemble.
/// One instance per process; safe to share across request handlers.
pub struct PortfolioEngine {
    scorer: RiskScorer,
    ensemble: StrategyEnsemble,
    default_portfolio_value: f64,
}

impl PortfolioEngine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            scorer: RiskScorer::new(cfg),
            ensemble: StrategyEnsemble::new(cfg),
            default_portfolio_value: cfg.default_portfolio_value,
        }
    }

    pub fn with_store(cfg: &Config, store: Box<dyn PerformanceStore>) -> Self {
        Self {
            scorer: RiskScorer::new(cfg),
            ensemble: StrategyEnsemble::with_store(cfg, store),
            default_portfolio_value: cfg.default_portfolio_value,
        }
    }

    pub fn assess_portfolio_risk(
        &self,
        positions: &[Position],
        portfolio_value: Option<f64>,
    ) -> RiskAssessment {
        let value = portfolio_value
            .filter(|v| *v > 0.0)
            .unwrap_or(self.default_portfolio_value);
        self.scorer.assess(positions, value, Utc::now())
    }

    pub fn generate_ensemble_recommendations(
        &self,
        market: &HashMap<String, MarketSnapshot>,
        strategies: &[StrategyCandidate],
        context: &PortfolioContext,
    ) -> EnsembleResult {
        self.ensemble
            .generate_recommendations(market, strategies, context)
    }

    pub fn record_strategy_performance(
        &self,
        strategy_key: &str,
        is_win: bool,
        return_percent: f64,
    ) {
        self.ensemble
            .record_performance(strategy_key, is_win, return_percent);
    }

    pub fn ensemble_weights(&self) -> std::collections::BTreeMap<String, f64> {
        self.ensemble.current_weights()
    }
}
