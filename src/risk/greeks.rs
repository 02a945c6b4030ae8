use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Position;

// Linear proxy coefficients. Fixed for behavioral parity with the upstream
// scorer; this is deliberately NOT a Black-Scholes model.
const DELTA_COEF: f64 = 0.5;
const GAMMA_COEF: f64 = 0.02;
const THETA_COEF: f64 = 0.05;
const VEGA_COEF: f64 = 0.1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksExposure {
    pub total_delta: f64,
    pub total_gamma: f64,
    pub total_theta: f64,
    pub total_vega: f64,
    pub net_exposure: f64,
}

/// Aggregate approximate Greeks across all positions whose strategy name
/// contains "call" or "put" (the only type discriminator available).
pub fn compute_greeks(positions: &[Position], now: DateTime<Utc>) -> GreeksExposure {
    let mut out = GreeksExposure::default();

    for p in positions {
        let name = p.strategy.to_lowercase();
        let direction = if name.contains("call") {
            1.0
        } else if name.contains("put") {
            -1.0
        } else {
            continue;
        };

        let dte = p.dte_at(now).max(1) as f64;
        out.total_delta += p.current_value * DELTA_COEF * direction;
        out.total_gamma += p.notional() * GAMMA_COEF;
        out.total_theta -= p.notional() * THETA_COEF / dte;
        out.total_vega += p.notional() * VEGA_COEF;
    }

    out.total_delta = round4(out.total_delta);
    out.total_gamma = round4(out.total_gamma);
    out.total_theta = round4(out.total_theta);
    out.total_vega = round4(out.total_vega);
    out.net_exposure = out.total_delta.abs();
    out
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{position, with_dte};

    #[test]
    fn non_option_strategies_contribute_nothing() {
        let positions = vec![position("SPY", "Index", "Covered Stock", 10_000.0)];
        let g = compute_greeks(&positions, Utc::now());
        assert!((g.total_delta).abs() < 1e-9);
        assert!((g.total_vega).abs() < 1e-9);
    }

    #[test]
    fn call_and_put_deltas_offset() {
        let now = Utc::now();
        let positions = vec![
            with_dte(position("SOFI", "Financial", "Long Call", 10_000.0), 30, now),
            with_dte(position("PLTR", "Technology", "Long Put", 10_000.0), 30, now),
        ];
        let g = compute_greeks(&positions, now);
        // +10000*0.5 - 10000*0.5
        assert!((g.total_delta).abs() < 1e-9);
        assert!((g.net_exposure).abs() < 1e-9);
        // Gamma/vega accumulate on absolute notional regardless of side
        assert!((g.total_gamma - 400.0).abs() < 1e-6);
        assert!((g.total_vega - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn theta_scales_inversely_with_dte() {
        let now = Utc::now();
        let near = vec![with_dte(
            position("SOFI", "Financial", "Long Call", 10_000.0),
            5,
            now,
        )];
        let far = vec![with_dte(
            position("SOFI", "Financial", "Long Call", 10_000.0),
            50,
            now,
        )];
        let g_near = compute_greeks(&near, now);
        let g_far = compute_greeks(&far, now);
        assert!(g_near.total_theta < g_far.total_theta);
        // 10000 * 0.05 / 5
        assert!((g_near.total_theta + 100.0).abs() < 1e-6);
    }

    #[test]
    fn expired_position_uses_dte_floor_of_one() {
        let now = Utc::now();
        let positions = vec![with_dte(
            position("SOFI", "Financial", "Long Call", 1000.0),
            0,
            now,
        )];
        let g = compute_greeks(&positions, now);
        assert!((g.total_theta + 50.0).abs() < 1e-6);
    }
}
