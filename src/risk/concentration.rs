use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Position;

const LARGEST_POSITIONS_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExposureBucket {
    pub value: f64,
    /// Share of total portfolio notional, 0..1.
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionShare {
    pub symbol: String,
    pub strategy: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationBreakdown {
    pub by_sector: HashMap<String, ExposureBucket>,
    pub by_strategy: HashMap<String, ExposureBucket>,
    pub by_symbol: HashMap<String, ExposureBucket>,
    pub largest_positions: Vec<PositionShare>,
    pub total_value: f64,
}

impl ConcentrationBreakdown {
    pub fn max_sector_percentage(&self) -> f64 {
        self.by_sector
            .values()
            .map(|b| b.percentage)
            .fold(0.0, f64::max)
    }
}

/// Group positions by sector/strategy/symbol and compute each bucket's share
/// of total portfolio notional. A zero-notional portfolio yields all-empty
/// structures rather than dividing by zero.
pub fn compute_concentration(positions: &[Position]) -> ConcentrationBreakdown {
    let total: f64 = positions.iter().map(|p| p.notional()).sum();
    if total <= 0.0 {
        return ConcentrationBreakdown::default();
    }

    let mut by_sector: HashMap<String, ExposureBucket> = HashMap::new();
    let mut by_strategy: HashMap<String, ExposureBucket> = HashMap::new();
    let mut by_symbol: HashMap<String, ExposureBucket> = HashMap::new();

    for p in positions {
        let value = p.notional();
        let sector = non_empty(&p.sector);
        let strategy = non_empty(&p.strategy);

        by_sector.entry(sector).or_default().value += value;
        by_strategy.entry(strategy).or_default().value += value;
        by_symbol.entry(p.symbol.clone()).or_default().value += value;
    }

    for bucket in by_sector
        .values_mut()
        .chain(by_strategy.values_mut())
        .chain(by_symbol.values_mut())
    {
        bucket.percentage = round4(bucket.value / total);
    }

    let mut largest: Vec<PositionShare> = positions
        .iter()
        .map(|p| PositionShare {
            symbol: p.symbol.clone(),
            strategy: p.strategy.clone(),
            value: p.notional(),
            percentage: round4(p.notional() / total),
        })
        .collect();
    largest.sort_by(|a, b| b.percentage.partial_cmp(&a.percentage).unwrap());
    largest.truncate(LARGEST_POSITIONS_LIMIT);

    ConcentrationBreakdown {
        by_sector,
        by_strategy,
        by_symbol,
        largest_positions: largest,
        total_value: total,
    }
}

fn non_empty(s: &str) -> String {
    if s.is_empty() {
        "Unknown".to_string()
    } else {
        s.to_string()
    }
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
