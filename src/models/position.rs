use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTE assumed for positions that arrive without an expiration date.
pub const DEFAULT_DTE: i64 = 30;

/// A held or candidate options trade, as supplied by the caller.
///
/// Boundary shape: camelCase JSON with defensive defaults applied once by
/// serde. Aliases accept the upstream field spellings (`strategyName`,
/// `positionSize`, `unrealizedPnL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    #[serde(default = "default_sector")]
    pub sector: String,
    #[serde(default, alias = "strategyName")]
    pub strategy: String,
    #[serde(default, alias = "positionSize")]
    pub current_value: f64,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "unrealizedPnL")]
    pub unrealized_pnl: f64,
    #[serde(default)]
    pub max_loss: f64,
    #[serde(default = "default_liquidity")]
    pub liquidity_score: f64,
}

fn default_sector() -> String {
    "Unknown".to_string()
}

fn default_liquidity() -> f64 {
    50.0
}

impl Position {
    /// Days to expiration at `now`, floored at 0. Always recomputed from
    /// `expiration_date` rather than trusted as stored state.
    pub fn dte_at(&self, now: DateTime<Utc>) -> i64 {
        match self.expiration_date {
            Some(exp) => (exp - now).num_days().max(0),
            None => DEFAULT_DTE,
        }
    }

    pub fn dte(&self) -> i64 {
        self.dte_at(Utc::now())
    }

    /// Absolute notional used for all concentration math.
    pub fn notional(&self) -> f64 {
        self.current_value.abs()
    }
}
