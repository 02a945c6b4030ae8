pub mod market;
pub mod position;
pub mod strategy;

pub use market::{MarketMetrics, MarketSnapshot, RegimeKind};
pub use position::Position;
pub use strategy::{StrategyCandidate, StrategyGroupId};
