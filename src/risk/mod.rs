pub mod concentration;
pub mod greeks;
pub mod scorer;

pub use concentration::{compute_concentration, ConcentrationBreakdown};
pub use greeks::{compute_greeks, GreeksExposure};
pub use scorer::{RiskAssessment, RiskLevel, RiskScorer};
