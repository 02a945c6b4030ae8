pub mod groups;
pub mod regime;
pub mod store;
pub mod weighter;

pub use groups::classify_strategy;
pub use regime::{classify_regime, MarketRegime};
pub use store::{JsonFileStore, PerformanceStore};
pub use weighter::{EnsembleResult, PortfolioContext, StrategyEnsemble};
