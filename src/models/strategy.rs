use serde::{Deserialize, Serialize};
use std::fmt;

/// The six fixed ensemble allocation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyGroupId {
    VolatilityExpansion,
    RangeBoundIncome,
    DirectionalMomentum,
    HighProbabilityIncome,
    VolatilityContraction,
    AdaptiveMomentum,
}

impl StrategyGroupId {
    pub const ALL: [StrategyGroupId; 6] = [
        StrategyGroupId::VolatilityExpansion,
        StrategyGroupId::RangeBoundIncome,
        StrategyGroupId::DirectionalMomentum,
        StrategyGroupId::HighProbabilityIncome,
        StrategyGroupId::VolatilityContraction,
        StrategyGroupId::AdaptiveMomentum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyGroupId::VolatilityExpansion => "volatilityExpansion",
            StrategyGroupId::RangeBoundIncome => "rangeBoundIncome",
            StrategyGroupId::DirectionalMomentum => "directionalMomentum",
            StrategyGroupId::HighProbabilityIncome => "highProbabilityIncome",
            StrategyGroupId::VolatilityContraction => "volatilityContraction",
            StrategyGroupId::AdaptiveMomentum => "adaptiveMomentum",
        }
    }
}

impl fmt::Display for StrategyGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate strategy from the upstream analyzer. The `group` tag is set
/// at catalog construction time where available; untagged candidates are
/// resolved once at the boundary via the group alias table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyCandidate {
    #[serde(alias = "strategyKey")]
    pub strategy: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub ai_score: f64,
    #[serde(default)]
    pub group: Option<StrategyGroupId>,
}
