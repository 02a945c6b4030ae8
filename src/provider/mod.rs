pub mod fmp;

pub use fmp::FmpClient;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::models::MarketSnapshot;

/// Boundary collaborator supplying per-symbol snapshots. The core assumes
/// only the field shapes, never live-data semantics.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_snapshots(&mut self, symbols: &[String]) -> Result<HashMap<String, MarketSnapshot>>;
}

/// Canned provider used offline and in tests.
pub struct StaticProvider {
    snapshots: HashMap<String, MarketSnapshot>,
}

impl StaticProvider {
    pub fn new(snapshots: HashMap<String, MarketSnapshot>) -> Self {
        Self { snapshots }
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn fetch_snapshots(&mut self, symbols: &[String]) -> Result<HashMap<String, MarketSnapshot>> {
        Ok(symbols
            .iter()
            .filter_map(|s| self.snapshots.get(s).map(|v| (s.clone(), v.clone())))
            .collect())
    }
}
