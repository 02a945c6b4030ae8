use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-symbol market snapshot from the upstream data provider. Only the
/// field shapes are assumed; no live-data semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub avg_volume: f64,
    #[serde(default)]
    pub holy_grail: f64,
}

/// The seven market regimes, in fixed scoring/tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeKind {
    LowVolatility,
    HighVolatility,
    TrendingBullish,
    TrendingBearish,
    RangeBound,
    VolatilityExpansion,
    MomentumBreakout,
}

impl RegimeKind {
    pub const ALL: [RegimeKind; 7] = [
        RegimeKind::LowVolatility,
        RegimeKind::HighVolatility,
        RegimeKind::TrendingBullish,
        RegimeKind::TrendingBearish,
        RegimeKind::RangeBound,
        RegimeKind::VolatilityExpansion,
        RegimeKind::MomentumBreakout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeKind::LowVolatility => "low_volatility",
            RegimeKind::HighVolatility => "high_volatility",
            RegimeKind::TrendingBullish => "trending_bullish",
            RegimeKind::TrendingBearish => "trending_bearish",
            RegimeKind::RangeBound => "range_bound",
            RegimeKind::VolatilityExpansion => "volatility_expansion",
            RegimeKind::MomentumBreakout => "momentum_breakout",
        }
    }
}

impl fmt::Display for RegimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Averaged metrics the regime classifier derived from one snapshot map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub avg_iv: f64,
    pub avg_change_percent: f64,
    pub squeeze_count: usize,
    pub high_volume_count: usize,
}
