use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::{MarketMetrics, MarketSnapshot, RegimeKind};

const DEFAULT_IV: f64 = 0.25;
const HIGH_IV: f64 = 0.35;
const LOW_IV: f64 = 0.20;
const TREND_CHANGE_PCT: f64 = 1.5;
const SQUEEZE_HOLY_GRAIL: f64 = 60.0;
const SQUEEZE_FRACTION: f64 = 0.3;
const HIGH_VOLUME_RATIO: f64 = 1.5;
const HIGH_VOLUME_FRACTION: f64 = 0.4;

/// Classification result. `primary` is a regime name string so the degraded
/// `"unknown"` result shares the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRegime {
    pub primary: String,
    pub confidence: f64,
    pub scores: BTreeMap<String, f64>,
    pub metrics: MarketMetrics,
}

impl MarketRegime {
    /// Fallback shape used when the ensemble degrades.
    pub fn unknown() -> Self {
        Self {
            primary: "unknown".to_string(),
            confidence: 0.0,
            scores: BTreeMap::new(),
            metrics: MarketMetrics::default(),
        }
    }

    pub fn score(&self, kind: RegimeKind) -> f64 {
        self.scores.get(kind.as_str()).copied().unwrap_or(0.0)
    }
}

/// Score a snapshot map against the seven fixed regimes using averaged-metric
/// thresholds. Deterministic; ties break toward the first regime in
/// `RegimeKind::ALL` order.
pub fn classify_regime(market: &HashMap<String, MarketSnapshot>) -> MarketRegime {
    let n = market.len();
    let mut scores = [0.0f64; 7];

    let avg_iv = if n == 0 {
        DEFAULT_IV
    } else {
        market
            .values()
            .map(|s| s.implied_volatility.unwrap_or(DEFAULT_IV))
            .sum::<f64>()
            / n as f64
    };
    let avg_change = if n == 0 {
        0.0
    } else {
        market.values().map(|s| s.change_percent).sum::<f64>() / n as f64
    };
    let squeeze_count = market
        .values()
        .filter(|s| s.holy_grail >= SQUEEZE_HOLY_GRAIL)
        .count();
    let high_volume_count = market
        .values()
        .filter(|s| s.avg_volume > 0.0 && s.volume > HIGH_VOLUME_RATIO * s.avg_volume)
        .count();

    if avg_iv > HIGH_IV {
        bump(&mut scores, RegimeKind::HighVolatility, 40.0);
        bump(&mut scores, RegimeKind::VolatilityExpansion, 20.0);
    } else if avg_iv < LOW_IV {
        bump(&mut scores, RegimeKind::LowVolatility, 40.0);
        bump(&mut scores, RegimeKind::VolatilityExpansion, 30.0);
    }

    if avg_change > TREND_CHANGE_PCT {
        bump(&mut scores, RegimeKind::TrendingBullish, 35.0);
        bump(&mut scores, RegimeKind::MomentumBreakout, 25.0);
    } else if avg_change < -TREND_CHANGE_PCT {
        bump(&mut scores, RegimeKind::TrendingBearish, 35.0);
        bump(&mut scores, RegimeKind::MomentumBreakout, 20.0);
    } else {
        bump(&mut scores, RegimeKind::RangeBound, 30.0);
    }

    if n > 0 && squeeze_count as f64 / n as f64 > SQUEEZE_FRACTION {
        bump(&mut scores, RegimeKind::VolatilityExpansion, 25.0);
        bump(&mut scores, RegimeKind::MomentumBreakout, 20.0);
    }

    if n > 0 && high_volume_count as f64 / n as f64 > HIGH_VOLUME_FRACTION {
        bump(&mut scores, RegimeKind::MomentumBreakout, 15.0);
        bump(&mut scores, RegimeKind::TrendingBullish, 10.0);
    }

    let mut primary = RegimeKind::ALL[0];
    let mut best = scores[0];
    for (i, kind) in RegimeKind::ALL.iter().enumerate().skip(1) {
        if scores[i] > best {
            best = scores[i];
            primary = *kind;
        }
    }

    MarketRegime {
        primary: primary.as_str().to_string(),
        confidence: best.min(100.0),
        scores: RegimeKind::ALL
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str().to_string(), scores[i]))
            .collect(),
        metrics: MarketMetrics {
            avg_iv: round4(avg_iv),
            avg_change_percent: round4(avg_change),
            squeeze_count,
            high_volume_count,
        },
    }
}

fn bump(scores: &mut [f64; 7], kind: RegimeKind, amount: f64) {
    let idx = RegimeKind::ALL.iter().position(|k| *k == kind).unwrap();
    scores[idx] += amount;
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{market_of, snapshot};

    #[test]
    fn high_iv_flat_market_is_high_volatility() {
        let market = market_of(10, 0.5, 0.0);
        let r = classify_regime(&market);
        assert_eq!(r.primary, "high_volatility");
        assert!((r.confidence - 40.0).abs() < 1e-9);
    }

    #[test]
    fn low_iv_quiet_market_favors_low_volatility() {
        let market = market_of(5, 0.15, 0.0);
        let r = classify_regime(&market);
        assert_eq!(r.primary, "low_volatility");
        assert!((r.score(RegimeKind::VolatilityExpansion) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn strong_rally_is_trending_bullish() {
        let market = market_of(5, 0.25, 2.5);
        let r = classify_regime(&market);
        assert_eq!(r.primary, "trending_bullish");
        assert!((r.score(RegimeKind::MomentumBreakout) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn selloff_is_trending_bearish() {
        let market = market_of(5, 0.25, -2.0);
        let r = classify_regime(&market);
        assert_eq!(r.primary, "trending_bearish");
    }

    #[test]
    fn empty_market_degrades_to_range_bound() {
        let market = HashMap::new();
        let r = classify_regime(&market);
        assert_eq!(r.primary, "range_bound");
        assert!((r.confidence - 30.0).abs() < 1e-9);
        assert!((r.metrics.avg_iv - 0.25).abs() < 1e-9);
    }

    #[test]
    fn squeeze_cluster_boosts_volatility_expansion() {
        let mut market = HashMap::new();
        for i in 0..4 {
            let mut s = snapshot(0.15, 0.0);
            s.holy_grail = 75.0;
            market.insert(format!("SQ{}", i), s);
        }
        for i in 0..4 {
            market.insert(format!("XX{}", i), snapshot(0.15, 0.0));
        }
        // avg_iv 0.15: low_volatility 40, volatility_expansion 30
        // squeeze fraction 0.5: volatility_expansion +25 = 55 wins
        let r = classify_regime(&market);
        assert_eq!(r.primary, "volatility_expansion");
        assert!((r.confidence - 55.0).abs() < 1e-9);
        assert_eq!(r.metrics.squeeze_count, 4);
    }

    #[test]
    fn heavy_volume_boosts_momentum_breakout() {
        let mut market = HashMap::new();
        for i in 0..5 {
            let mut s = snapshot(0.25, 2.0);
            s.volume = 2_000_000.0;
            s.avg_volume = 1_000_000.0;
            market.insert(format!("V{}", i), s);
        }
        let r = classify_regime(&market);
        // bullish 35 + 10 volume = 45; breakout 25 + 15 = 40
        assert_eq!(r.primary, "trending_bullish");
        assert!((r.confidence - 45.0).abs() < 1e-9);
        assert_eq!(r.metrics.high_volume_count, 5);
    }

    #[test]
    fn classification_is_deterministic() {
        let market = market_of(7, 0.4, 1.8);
        let a = classify_regime(&market);
        let b = classify_regime(&market);
        assert_eq!(a.primary, b.primary);
        assert_eq!(a.scores, b.scores);
    }
}
