use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::warn;

use crate::config::Config;
use crate::ensemble::groups::{classify_strategy, condition_bonus, GroupProfile, GROUP_CATALOG};
use crate::ensemble::regime::{classify_regime, MarketRegime};
use crate::ensemble::store::{GroupPerformance, PerformanceSnapshot, PerformanceStore};
use crate::error::EngineError;
use crate::models::{MarketSnapshot, Position, StrategyCandidate, StrategyGroupId};

const GROUP_COUNT: f64 = 6.0;
const DIVERSIFICATION_FACTOR: f64 = 1.5;
const SLOTS_PER_WEIGHT: f64 = 10.0;
const WEIGHT_SCORE_SCALE: f64 = 30.0;
const ALIGNMENT_SCORE_SCALE: f64 = 20.0;
const WIN_RATE_SCORE_SCALE: f64 = 40.0;
const REGIME_MULT_FLOOR: f64 = 0.5;
const REGIME_MULT_CEILING: f64 = 1.5;
const OVERCONCENTRATED_SHARE: f64 = 0.40;
const ELEVATED_SHARE: f64 = 0.25;

/// Per-group mutable state: the re-derived allocation weight plus cumulative
/// performance counters. The one piece of state that outlives a request.
#[derive(Debug, Clone, Default)]
struct GroupState {
    current_weight: f64,
    wins: u64,
    losses: u64,
    total_return: f64,
}

impl GroupState {
    fn trades(&self) -> u64 {
        self.wins + self.losses
    }

    fn win_rate(&self) -> f64 {
        if self.trades() == 0 {
            0.5
        } else {
            self.wins as f64 / self.trades() as f64
        }
    }
}

struct EnsembleState {
    groups: HashMap<StrategyGroupId, GroupState>,
}

impl EnsembleState {
    fn new() -> Self {
        let groups = GROUP_CATALOG
            .iter()
            .map(|g| {
                (
                    g.id,
                    GroupState {
                        current_weight: g.base_weight,
                        ..GroupState::default()
                    },
                )
            })
            .collect();
        Self { groups }
    }

    fn snapshot(&self) -> PerformanceSnapshot {
        let groups = self
            .groups
            .iter()
            .map(|(id, gs)| {
                (
                    id.as_str().to_string(),
                    GroupPerformance {
                        wins: gs.wins,
                        losses: gs.losses,
                        total_return: gs.total_return,
                    },
                )
            })
            .collect();
        PerformanceSnapshot { groups }
    }

    fn restore(&mut self, snapshot: &PerformanceSnapshot) {
        for (name, perf) in &snapshot.groups {
            let Some(id) = StrategyGroupId::ALL.iter().find(|g| g.as_str() == name) else {
                continue;
            };
            if let Some(gs) = self.groups.get_mut(id) {
                gs.wins = perf.wins;
                gs.losses = perf.losses;
                gs.total_return = perf.total_return;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioContext {
    #[serde(default)]
    pub active_trades: Vec<Position>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecommendation {
    pub strategy: String,
    pub symbol: String,
    pub group: Option<StrategyGroupId>,
    pub ai_score: f64,
    pub ensemble_score: f64,
    pub portfolio_allocation: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_candidates: usize,
    pub matched_candidates: usize,
    pub active_trades: usize,
    pub group_shares: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceSignal {
    pub group: StrategyGroupId,
    pub current_weight: f64,
    pub active_share: f64,
    pub drift: f64,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleResult {
    pub recommendations: Vec<StrategyRecommendation>,
    pub ensemble_weights: BTreeMap<String, f64>,
    pub market_regime: MarketRegime,
    pub portfolio_metrics: PortfolioMetrics,
    pub rebalance_signals: Vec<RebalanceSignal>,
}

/// Maintains the six strategy groups, re-weights them per trading cycle from
/// recorded performance, detected regime, and portfolio concentration, then
/// filters and ranks candidate strategies.
///
/// All state lives behind an internal mutex; hosts may call from concurrent
/// requests without lost updates.
pub struct StrategyEnsemble {
    min_weight: f64,
    max_weight: f64,
    min_trades: u64,
    drift_threshold: f64,
    state: Mutex<EnsembleState>,
    store: Option<Box<dyn PerformanceStore>>,
}

impl StrategyEnsemble {
    pub fn new(cfg: &Config) -> Self {
        Self {
            min_weight: cfg.min_group_weight,
            max_weight: cfg.max_group_weight,
            min_trades: cfg.min_trades_for_performance,
            drift_threshold: cfg.rebalance_drift_threshold,
            state: Mutex::new(EnsembleState::new()),
            store: None,
        }
    }

    pub fn with_store(cfg: &Config, store: Box<dyn PerformanceStore>) -> Self {
        let mut ensemble = Self::new(cfg);
        match store.load() {
            Ok(Some(snapshot)) => {
                if let Ok(mut state) = ensemble.state.lock() {
                    state.restore(&snapshot);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load ensemble performance history: {}", e),
        }
        ensemble.store = Some(store);
        ensemble
    }

    /// Classify the regime, re-weight the six groups, and rank candidates.
    /// On any internal fault this degrades to the unmodified candidate list
    /// with an unknown regime rather than propagating the error.
    pub fn generate_recommendations(
        &self,
        market: &HashMap<String, MarketSnapshot>,
        strategies: &[StrategyCandidate],
        context: &PortfolioContext,
    ) -> EnsembleResult {
        match self.try_generate(market, strategies, context) {
            Ok(result) => result,
            Err(e) => {
                warn!("Ensemble pass failed, returning degraded result: {}", e);
                degraded_result(strategies)
            }
        }
    }

    /// Record one closed trade against its owning group. The only persistent
    /// mutation across calls.
    pub fn record_performance(&self, strategy_key: &str, is_win: bool, return_percent: f64) {
        let Some(group) = classify_strategy(strategy_key) else {
            warn!("No strategy group matches '{}', outcome dropped", strategy_key);
            return;
        };

        let snapshot = match self.state.lock() {
            Ok(mut state) => {
                let gs = state.groups.entry(group).or_default();
                if is_win {
                    gs.wins += 1;
                } else {
                    gs.losses += 1;
                }
                gs.total_return += return_percent;
                state.snapshot()
            }
            Err(_) => {
                warn!("Ensemble state lock poisoned, outcome dropped");
                return;
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&snapshot) {
                warn!("Failed to persist ensemble performance: {}", e);
            }
        }
    }

    /// Current normalized group weights, for dashboards and logging.
    pub fn current_weights(&self) -> BTreeMap<String, f64> {
        match self.state.lock() {
            Ok(state) => GROUP_CATALOG
                .iter()
                .map(|g| {
                    (
                        g.id.as_str().to_string(),
                        state.groups[&g.id].current_weight,
                    )
                })
                .collect(),
            Err(_) => BTreeMap::new(),
        }
    }

    fn try_generate(
        &self,
        market: &HashMap<String, MarketSnapshot>,
        strategies: &[StrategyCandidate],
        context: &PortfolioContext,
    ) -> Result<EnsembleResult, EngineError> {
        let regime = classify_regime(market);
        let shares = trade_shares(&context.active_trades);

        let mut state = self.state.lock().map_err(|_| EngineError::StatePoisoned)?;
        let raw = self.raw_weights(&state, &regime, &shares);
        let sum: f64 = raw.iter().sum();
        for (i, g) in GROUP_CATALOG.iter().enumerate() {
            state.groups.get_mut(&g.id).unwrap().current_weight = raw[i] / sum;
        }

        let weights: BTreeMap<String, f64> = GROUP_CATALOG
            .iter()
            .map(|g| {
                (
                    g.id.as_str().to_string(),
                    state.groups[&g.id].current_weight,
                )
            })
            .collect();

        let recommendations = self.select_candidates(&state, &regime, strategies);
        let rebalance_signals = self.rebalance_signals(&state, &shares, context);

        let matched = strategies
            .iter()
            .filter(|c| c.group.or_else(|| classify_strategy(&c.strategy)).is_some())
            .count();

        Ok(EnsembleResult {
            recommendations,
            ensemble_weights: weights,
            market_regime: regime,
            portfolio_metrics: PortfolioMetrics {
                total_candidates: strategies.len(),
                matched_candidates: matched,
                active_trades: context.active_trades.len(),
                group_shares: shares
                    .iter()
                    .map(|(id, s)| (id.as_str().to_string(), round4(*s)))
                    .collect(),
            },
            rebalance_signals,
        })
    }

    /// Clamped pre-normalization weights, in catalog order.
    fn raw_weights(
        &self,
        state: &EnsembleState,
        regime: &MarketRegime,
        shares: &HashMap<StrategyGroupId, f64>,
    ) -> [f64; 6] {
        let mut raw = [0.0; 6];
        for (i, g) in GROUP_CATALOG.iter().enumerate() {
            let gs = &state.groups[&g.id];
            let perf = performance_multiplier(gs, self.min_trades);
            let reg = regime_multiplier(g, regime);
            let risk = risk_multiplier(shares.get(&g.id).copied().unwrap_or(0.0));
            raw[i] = (g.base_weight * perf * reg * risk).clamp(self.min_weight, self.max_weight);
        }
        raw
    }

    fn select_candidates(
        &self,
        state: &EnsembleState,
        regime: &MarketRegime,
        strategies: &[StrategyCandidate],
    ) -> Vec<StrategyRecommendation> {
        let mut by_group: HashMap<StrategyGroupId, Vec<&StrategyCandidate>> = HashMap::new();
        for c in strategies {
            if let Some(id) = c.group.or_else(|| classify_strategy(&c.strategy)) {
                by_group.entry(id).or_default().push(c);
            }
        }

        let mut picks: Vec<StrategyRecommendation> = Vec::new();
        for g in &GROUP_CATALOG {
            let Some(candidates) = by_group.get_mut(&g.id) else {
                continue;
            };
            candidates.sort_by(|a, b| b.ai_score.partial_cmp(&a.ai_score).unwrap());

            let gs = &state.groups[&g.id];
            let slots = (gs.current_weight * SLOTS_PER_WEIGHT).ceil() as usize;
            let alignment = regime_alignment(g, regime);

            for c in candidates.iter().take(slots) {
                let score = (c.ai_score
                    + gs.current_weight * WEIGHT_SCORE_SCALE
                    + alignment * ALIGNMENT_SCORE_SCALE
                    + (gs.win_rate() - 0.5) * WIN_RATE_SCORE_SCALE)
                    .clamp(0.0, 100.0);
                picks.push(StrategyRecommendation {
                    strategy: c.strategy.clone(),
                    symbol: c.symbol.clone(),
                    group: Some(g.id),
                    ai_score: c.ai_score,
                    ensemble_score: round2(score),
                    portfolio_allocation: 0.0,
                });
            }
        }

        picks.sort_by(|a, b| b.ensemble_score.partial_cmp(&a.ensemble_score).unwrap());

        // No group may dominate the final list.
        let cap = ((strategies.len() as f64 / GROUP_COUNT) * DIVERSIFICATION_FACTOR).ceil()
            as usize;
        let mut per_group: HashMap<StrategyGroupId, usize> = HashMap::new();
        let mut selected: Vec<StrategyRecommendation> = Vec::new();
        for pick in picks {
            let count = per_group.entry(pick.group.unwrap()).or_default();
            if *count >= cap {
                continue;
            }
            *count += 1;
            selected.push(pick);
        }

        let n = selected.len();
        if n > 0 {
            let base_allocation = 1.0 / n as f64;
            for rec in &mut selected {
                let weight = state.groups[&rec.group.unwrap()].current_weight;
                rec.portfolio_allocation =
                    round4(base_allocation * weight * (rec.ensemble_score / 100.0));
            }
        }

        selected
    }

    fn rebalance_signals(
        &self,
        state: &EnsembleState,
        shares: &HashMap<StrategyGroupId, f64>,
        context: &PortfolioContext,
    ) -> Vec<RebalanceSignal> {
        if context.active_trades.is_empty() {
            return Vec::new();
        }

        let mut signals = Vec::new();
        for g in &GROUP_CATALOG {
            let weight = state.groups[&g.id].current_weight;
            let share = shares.get(&g.id).copied().unwrap_or(0.0);
            let drift = share - weight;
            if drift.abs() > self.drift_threshold {
                signals.push(RebalanceSignal {
                    group: g.id,
                    current_weight: round4(weight),
                    active_share: round4(share),
                    drift: round4(drift),
                    action: if drift > 0.0 {
                        "REDUCE_ALLOCATION".to_string()
                    } else {
                        "INCREASE_ALLOCATION".to_string()
                    },
                });
            }
        }
        signals
    }
}

/// 1.0 until a group has enough recorded trades, then a win-rate and
/// normalized-return blend in [0.7, 1.3].
fn performance_multiplier(gs: &GroupState, min_trades: u64) -> f64 {
    if gs.trades() < min_trades {
        return 1.0;
    }
    let win_rate = gs.win_rate();
    let avg_return = (gs.total_return / gs.trades() as f64).clamp(-100.0, 100.0);
    let normalized_return = (avg_return + 100.0) / 200.0;
    0.7 + 0.6 * (0.5 * win_rate + 0.5 * normalized_return)
}

fn regime_multiplier(profile: &GroupProfile, regime: &MarketRegime) -> f64 {
    let mut mult = 1.0;
    for cond in profile.market_conditions {
        let (threshold, bonus) = condition_bonus(*cond);
        if regime.score(*cond) > threshold {
            mult += bonus;
        }
    }
    mult.clamp(REGIME_MULT_FLOOR, REGIME_MULT_CEILING)
}

fn risk_multiplier(active_share: f64) -> f64 {
    if active_share > OVERCONCENTRATED_SHARE {
        0.6
    } else if active_share > ELEVATED_SHARE {
        0.8
    } else {
        1.0
    }
}

fn regime_alignment(profile: &GroupProfile, regime: &MarketRegime) -> f64 {
    let aligned = profile
        .market_conditions
        .iter()
        .any(|c| c.as_str() == regime.primary);
    if aligned {
        regime.confidence / 100.0
    } else {
        0.0
    }
}

/// Fraction of active trades owned by each group.
fn trade_shares(active_trades: &[Position]) -> HashMap<StrategyGroupId, f64> {
    let total = active_trades.len();
    if total == 0 {
        return HashMap::new();
    }
    let mut counts: HashMap<StrategyGroupId, usize> = HashMap::new();
    for p in active_trades {
        if let Some(id) = classify_strategy(&p.strategy) {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(id, c)| (id, c as f64 / total as f64))
        .collect()
}

fn degraded_result(strategies: &[StrategyCandidate]) -> EnsembleResult {
    EnsembleResult {
        recommendations: strategies
            .iter()
            .map(|c| StrategyRecommendation {
                strategy: c.strategy.clone(),
                symbol: c.symbol.clone(),
                group: c.group,
                ai_score: c.ai_score,
                ensemble_score: c.ai_score,
                portfolio_allocation: 0.0,
            })
            .collect(),
        ensemble_weights: BTreeMap::new(),
        market_regime: MarketRegime::unknown(),
        portfolio_metrics: PortfolioMetrics::default(),
        rebalance_signals: Vec::new(),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
