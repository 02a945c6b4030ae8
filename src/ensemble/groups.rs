use crate::models::{RegimeKind, StrategyGroupId};

/// Static profile of one allocation bucket. Base weights across the six
/// groups sum to 1.0.
pub struct GroupProfile {
    pub id: StrategyGroupId,
    pub base_weight: f64,
    pub risk_profile: &'static str,
    pub market_conditions: &'static [RegimeKind],
    /// Lowercase name fragments used once, at the boundary, to tag incoming
    /// strategies with their owning group.
    pub aliases: &'static [&'static str],
}

pub const GROUP_CATALOG: [GroupProfile; 6] = [
    GroupProfile {
        id: StrategyGroupId::VolatilityExpansion,
        base_weight: 0.20,
        risk_profile: "aggressive",
        market_conditions: &[
            RegimeKind::VolatilityExpansion,
            RegimeKind::MomentumBreakout,
            RegimeKind::LowVolatility,
        ],
        aliases: &["straddle", "long call", "long put", "backspread", "squeeze"],
    },
    GroupProfile {
        id: StrategyGroupId::RangeBoundIncome,
        base_weight: 0.20,
        risk_profile: "conservative income",
        market_conditions: &[RegimeKind::RangeBound, RegimeKind::LowVolatility],
        aliases: &["condor", "strangle", "covered", "butterfly"],
    },
    GroupProfile {
        id: StrategyGroupId::DirectionalMomentum,
        base_weight: 0.18,
        risk_profile: "directional",
        market_conditions: &[
            RegimeKind::TrendingBullish,
            RegimeKind::TrendingBearish,
            RegimeKind::MomentumBreakout,
        ],
        aliases: &["bull call", "bear put", "vertical", "debit spread"],
    },
    GroupProfile {
        id: StrategyGroupId::HighProbabilityIncome,
        base_weight: 0.17,
        risk_profile: "high probability income",
        market_conditions: &[RegimeKind::RangeBound, RegimeKind::HighVolatility],
        aliases: &["credit", "bull put", "bear call", "cash secured", "wheel"],
    },
    GroupProfile {
        id: StrategyGroupId::VolatilityContraction,
        base_weight: 0.15,
        risk_profile: "premium selling",
        market_conditions: &[RegimeKind::HighVolatility],
        aliases: &["iron butterfly", "calendar", "diagonal", "ratio"],
    },
    GroupProfile {
        id: StrategyGroupId::AdaptiveMomentum,
        base_weight: 0.10,
        risk_profile: "adaptive",
        market_conditions: &[
            RegimeKind::MomentumBreakout,
            RegimeKind::TrendingBullish,
            RegimeKind::VolatilityExpansion,
        ],
        aliases: &["momentum", "breakout", "gamma", "scalp"],
    },
];

pub fn profile(id: StrategyGroupId) -> &'static GroupProfile {
    GROUP_CATALOG.iter().find(|g| g.id == id).unwrap()
}

/// Regime-score threshold and multiplier bonus per tagged market condition.
pub fn condition_bonus(kind: RegimeKind) -> (f64, f64) {
    match kind {
        RegimeKind::HighVolatility => (35.0, 0.3),
        RegimeKind::LowVolatility => (35.0, 0.25),
        RegimeKind::TrendingBullish => (30.0, 0.25),
        RegimeKind::TrendingBearish => (30.0, 0.25),
        RegimeKind::RangeBound => (25.0, 0.2),
        RegimeKind::VolatilityExpansion => (20.0, 0.3),
        RegimeKind::MomentumBreakout => (15.0, 0.15),
    }
}

/// Resolve the owning group for a strategy name via the alias table. Catalog
/// order is the precedence order; unmatched names stay untagged.
pub fn classify_strategy(name: &str) -> Option<StrategyGroupId> {
    let lname = name.to_lowercase();
    GROUP_CATALOG
        .iter()
        .find(|g| g.aliases.iter().any(|a| lname.contains(a)))
        .map(|g| g.id)
}
