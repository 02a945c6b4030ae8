use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::config::Config;
use crate::models::Position;
use crate::risk::concentration::{compute_concentration, ConcentrationBreakdown};
use crate::risk::greeks::{compute_greeks, GreeksExposure};

// Weighted-sum caps. Preserved literally: 40 + 30 + 30.
const CONCENTRATION_CAP: f64 = 40.0;
const TIME_DECAY_CAP: f64 = 30.0;
const POSITION_CAP: f64 = 30.0;
const TIME_DECAY_PER_POSITION: f64 = 10.0;
const POSITION_COMPONENT_SCALE: f64 = 0.3;

// Per-position risk factor scores.
const TIME_DECAY_SCORE: f64 = 30.0;
const OVERSIZED_SCORE: f64 = 25.0;
const MAX_LOSS_SCORE: f64 = 35.0;

const MONTH_DTE: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    None,
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Level for a non-empty portfolio. `None` is reserved for empty input.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            RiskLevel::Critical
        } else if score >= 60 {
            RiskLevel::High
        } else if score >= 40 {
            RiskLevel::Medium
        } else if score >= 20 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::None => "NONE",
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAlert {
    pub level: Priority,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRecommendation {
    pub action: String,
    pub priority: Priority,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    pub symbol: String,
    pub strategy: String,
    pub value: f64,
    pub dte: i64,
    pub risk_score: f64,
    pub factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRiskSummary {
    pub expiring_within_week: usize,
    pub expiring_within_month: usize,
    pub avg_dte: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationRiskSummary {
    /// Count of position pairs sharing a sector.
    pub same_sector_pairs: usize,
    /// Largest number of positions in any single sector.
    pub max_sector_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub overall_risk_score: u32,
    pub risk_level: RiskLevel,
    pub concentration: ConcentrationBreakdown,
    pub greeks: GreeksExposure,
    pub position_risks: Vec<PositionRisk>,
    pub time_risks: TimeRiskSummary,
    pub correlation_risks: CorrelationRiskSummary,
    pub alerts: Vec<RiskAlert>,
    pub recommendations: Vec<RiskRecommendation>,
}

impl RiskAssessment {
    fn empty() -> Self {
        Self {
            overall_risk_score: 0,
            risk_level: RiskLevel::None,
            concentration: ConcentrationBreakdown::default(),
            greeks: GreeksExposure::default(),
            position_risks: Vec::new(),
            time_risks: TimeRiskSummary::default(),
            correlation_risks: CorrelationRiskSummary::default(),
            alerts: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Combines concentration, time-decay, and per-position sub-scores into a
/// single 0-100 risk score with threshold-triggered alerts. Pure function of
/// its inputs; never fails on malformed data.
pub struct RiskScorer {
    sector_threshold: f64,
    critical_dte: i64,
    oversized_fraction: f64,
    max_loss_pnl: f64,
}

impl RiskScorer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            sector_threshold: cfg.sector_concentration_threshold,
            critical_dte: cfg.critical_dte,
            oversized_fraction: cfg.oversized_position_fraction,
            max_loss_pnl: cfg.max_loss_pnl_threshold,
        }
    }

    pub fn assess(
        &self,
        positions: &[Position],
        portfolio_value: f64,
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        if positions.is_empty() {
            return RiskAssessment::empty();
        }

        let concentration = compute_concentration(positions);
        let greeks = compute_greeks(positions, now);
        let position_risks: Vec<PositionRisk> = positions
            .iter()
            .map(|p| self.analyze_position(p, portfolio_value, now))
            .collect();

        let max_sector_pct = concentration.max_sector_percentage();
        let concentration_component =
            (max_sector_pct / self.sector_threshold * CONCENTRATION_CAP).min(CONCENTRATION_CAP);

        let expiring = positions
            .iter()
            .filter(|p| p.dte_at(now) <= self.critical_dte)
            .count();
        let time_component = (expiring as f64 * TIME_DECAY_PER_POSITION).min(TIME_DECAY_CAP);

        let avg_position_score = position_risks
            .iter()
            .map(|r| r.risk_score)
            .sum::<f64>()
            / position_risks.len() as f64;
        let position_component = (avg_position_score * POSITION_COMPONENT_SCALE).min(POSITION_CAP);

        let overall = (concentration_component + time_component + position_component)
            .min(100.0)
            .round() as u32;

        let alerts = self.build_alerts(&concentration, expiring);
        let recommendations = build_recommendations(overall);

        RiskAssessment {
            overall_risk_score: overall,
            risk_level: RiskLevel::from_score(overall),
            time_risks: time_summary(positions, now, self.critical_dte),
            correlation_risks: correlation_summary(positions),
            concentration,
            greeks,
            position_risks,
            alerts,
            recommendations,
        }
    }

    fn analyze_position(
        &self,
        p: &Position,
        portfolio_value: f64,
        now: DateTime<Utc>,
    ) -> PositionRisk {
        let mut score = 0.0;
        let mut factors = Vec::new();
        let dte = p.dte_at(now);

        if dte <= self.critical_dte {
            score += TIME_DECAY_SCORE;
            factors.push(RiskFactor {
                code: "CRITICAL_TIME_DECAY".to_string(),
                message: format!("{} expires in {} days", p.symbol, dte),
            });
        }

        if p.notional() > self.oversized_fraction * portfolio_value {
            score += OVERSIZED_SCORE;
            factors.push(RiskFactor {
                code: "OVERSIZED_POSITION".to_string(),
                message: format!(
                    "{} is {:.1}% of portfolio",
                    p.symbol,
                    p.notional() / portfolio_value * 100.0
                ),
            });
        }

        if p.unrealized_pnl < self.max_loss_pnl {
            score += MAX_LOSS_SCORE;
            factors.push(RiskFactor {
                code: "APPROACHING_MAX_LOSS".to_string(),
                message: format!(
                    "{} unrealized PnL {:.0} is approaching max loss",
                    p.symbol, p.unrealized_pnl
                ),
            });
        }

        PositionRisk {
            symbol: p.symbol.clone(),
            strategy: p.strategy.clone(),
            value: p.notional(),
            dte,
            risk_score: score.min(100.0),
            factors,
        }
    }

    fn build_alerts(
        &self,
        concentration: &ConcentrationBreakdown,
        expiring: usize,
    ) -> Vec<RiskAlert> {
        let mut alerts = Vec::new();

        // Sorted for deterministic output across identical calls.
        let mut hot_sectors: Vec<(&String, f64)> = concentration
            .by_sector
            .iter()
            .filter(|(_, b)| b.percentage > self.sector_threshold)
            .map(|(name, b)| (name, b.percentage))
            .collect();
        hot_sectors.sort_by(|a, b| a.0.cmp(b.0));

        for (sector, pct) in hot_sectors {
            alerts.push(RiskAlert {
                level: Priority::High,
                code: "SECTOR_CONCENTRATION".to_string(),
                message: format!(
                    "Sector {} is {:.1}% of portfolio (threshold {:.0}%)",
                    sector,
                    pct * 100.0,
                    self.sector_threshold * 100.0
                ),
            });
        }

        if expiring > 0 {
            alerts.push(RiskAlert {
                level: Priority::High,
                code: "EXPIRING_POSITIONS".to_string(),
                message: format!(
                    "{} position(s) expire within {} days",
                    expiring, self.critical_dte
                ),
            });
        }

        alerts
    }
}

fn build_recommendations(score: u32) -> Vec<RiskRecommendation> {
    let mut out = Vec::new();
    if score > 80 {
        out.push(RiskRecommendation {
            action: "REDUCE_RISK".to_string(),
            priority: Priority::High,
            reason: format!("Overall risk score {} is critical", score),
        });
    } else if score > 60 {
        out.push(RiskRecommendation {
            action: "HEDGE_EXPOSURE".to_string(),
            priority: Priority::Medium,
            reason: format!("Overall risk score {} is elevated", score),
        });
    } else if score < 30 {
        out.push(RiskRecommendation {
            action: "INCREASE_EXPOSURE".to_string(),
            priority: Priority::Low,
            reason: format!("Overall risk score {} leaves room for new positions", score),
        });
    }
    out
}

fn time_summary(positions: &[Position], now: DateTime<Utc>, critical_dte: i64) -> TimeRiskSummary {
    let dtes: Vec<i64> = positions.iter().map(|p| p.dte_at(now)).collect();
    let avg = dtes.iter().sum::<i64>() as f64 / dtes.len() as f64;
    TimeRiskSummary {
        expiring_within_week: dtes.iter().filter(|&&d| d <= critical_dte).count(),
        expiring_within_month: dtes.iter().filter(|&&d| d <= MONTH_DTE).count(),
        avg_dte: round2(avg),
    }
}

fn correlation_summary(positions: &[Position]) -> CorrelationRiskSummary {
    let mut sector_counts: HashMap<&str, usize> = HashMap::new();
    for p in positions {
        let sector = if p.sector.is_empty() {
            "Unknown"
        } else {
            p.sector.as_str()
        };
        *sector_counts.entry(sector).or_default() += 1;
    }
    let pairs = sector_counts.values().map(|&n| n * (n - 1) / 2).sum();
    let max_overlap = sector_counts.values().copied().max().unwrap_or(0);
    CorrelationRiskSummary {
        same_sector_pairs: pairs,
        max_sector_overlap: max_overlap,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
