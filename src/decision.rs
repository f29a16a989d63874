//! Point-scoring decision rule.
//!
//! Four independent signals and a risk overlay each contribute a score delta
//! and one driver note. The summed score maps to BUY / HOLD / SELL.

use std::fmt;

use crate::policy::{Policy, RiskThresholds};
use crate::risk::RiskAssessment;
use crate::stocks::MarketMetrics;

/// Number of driver notes on every decision, one per rule.
pub const DRIVER_COUNT: usize = 5;

const MIN_SUPPORTIVE_GROWTH: f64 = 0.05;
const ELEVATED_LEVERAGE: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    fn from_score(score: i32) -> Self {
        if score >= 3 {
            Recommendation::Buy
        } else if score >= 1 {
            Recommendation::Hold
        } else {
            Recommendation::Sell
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            Recommendation::Buy => {
                "Current performance supports a positive recommendation with risk limiting overall conviction."
            }
            Recommendation::Hold => {
                "Upside and risk are fairly evenly matched, suggesting a more neutral recommendation."
            }
            Recommendation::Sell => {
                "Risk factors outweigh the available upside under the current assumptions."
            }
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conviction {
    High,
    Moderate,
    Low,
}

impl Conviction {
    fn for_outcome(recommendation: Recommendation, risk_level: RiskLevel) -> Self {
        match (recommendation, risk_level) {
            (Recommendation::Buy, RiskLevel::Low) => Conviction::High,
            (Recommendation::Sell, _) => Conviction::Low,
            _ => Conviction::Moderate,
        }
    }
}

impl fmt::Display for Conviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Conviction::High => "High",
            Conviction::Moderate => "Moderate",
            Conviction::Low => "Low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    fn classify(risk_score: f64, thresholds: &RiskThresholds) -> Self {
        if risk_score >= thresholds.high_risk {
            RiskLevel::High
        } else if risk_score >= thresholds.medium_risk {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn penalty(&self) -> i32 {
        match self {
            RiskLevel::High => -2,
            RiskLevel::Medium => -1,
            RiskLevel::Low => 0,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub recommendation: Recommendation,
    pub conviction: Conviction,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub valuation_upside_pct: Option<f64>,
    pub decision_score: i32,
    pub rationale: &'static str,
    /// Valuation, growth, cash flow, leverage, risk overlay, in that order.
    pub driver_notes: [String; DRIVER_COUNT],
}

/// Outcome of a single rule.
#[derive(Debug, Clone, PartialEq)]
struct Signal {
    delta: i32,
    note: String,
}

impl Signal {
    fn new(delta: i32, note: impl Into<String>) -> Self {
        Self {
            delta,
            note: note.into(),
        }
    }
}

fn valuation_signal(upside: Option<f64>, min_upside: f64) -> Signal {
    match upside {
        Some(u) if u >= min_upside => Signal::new(
            2,
            format!(
                "Valuation proxy suggests upside of roughly {:.1}% (above the {:.1}% threshold).",
                u, min_upside
            ),
        ),
        Some(u) => Signal::new(
            0,
            format!(
                "Valuation proxy suggests upside of roughly {:.1}%, which is below the positive threshold.",
                u
            ),
        ),
        None => Signal::new(0, "Valuation signal unavailable due to missing P/E data."),
    }
}

fn growth_signal(revenue_growth: Option<f64>) -> Signal {
    match revenue_growth {
        Some(g) if g >= MIN_SUPPORTIVE_GROWTH => Signal::new(
            1,
            format!("Revenue growth remains supportive at around {:.1}% year-on-year.", g * 100.0),
        ),
        Some(g) => Signal::new(
            0,
            format!("Revenue growth is modest at around {:.1}% year-on-year.", g * 100.0),
        ),
        None => Signal::new(0, "Revenue growth data is unavailable."),
    }
}

fn cash_flow_signal(free_cash_flow: Option<f64>) -> Signal {
    match free_cash_flow {
        Some(fcf) if fcf > 0.0 => {
            Signal::new(1, "Free cash flow is positive, supporting earnings quality.")
        }
        Some(_) => Signal::new(0, "Free cash flow is weak, which weighs on earnings quality."),
        None => Signal::new(0, "Free cash flow data is unavailable."),
    }
}

fn leverage_signal(debt_to_equity: Option<f64>) -> Signal {
    match debt_to_equity {
        Some(d) if d > ELEVATED_LEVERAGE => Signal::new(
            -1,
            format!("Leverage appears elevated with a debt-to-equity ratio of roughly {:.1}.", d),
        ),
        Some(d) => Signal::new(
            0,
            format!("Leverage appears manageable with a debt-to-equity ratio of roughly {:.1}.", d),
        ),
        None => Signal::new(0, "Debt-to-equity data is unavailable."),
    }
}

fn risk_overlay(risk_level: RiskLevel) -> Signal {
    Signal::new(
        risk_level.penalty(),
        format!("Overall risk is assessed as {} based on the risk overlay.", risk_level),
    )
}

/// Combine valuation, operating metrics, leverage and weighted risk into a
/// recommendation.
pub fn decide(
    metrics: &MarketMetrics,
    upside: Option<f64>,
    risk: &RiskAssessment,
    policy: &Policy,
) -> Decision {
    let risk_score = risk.weighted_score(&policy.risk_weights);
    let risk_level = RiskLevel::classify(risk_score, &policy.risk_thresholds);

    let signals: [Signal; DRIVER_COUNT] = [
        valuation_signal(upside, policy.min_upside_pct_for_buy),
        growth_signal(metrics.revenue_growth),
        cash_flow_signal(metrics.free_cash_flow),
        leverage_signal(metrics.debt_to_equity),
        risk_overlay(risk_level),
    ];

    let decision_score: i32 = signals.iter().map(|s| s.delta).sum();
    let recommendation = Recommendation::from_score(decision_score);

    Decision {
        recommendation,
        conviction: Conviction::for_outcome(recommendation, risk_level),
        risk_level,
        risk_score,
        valuation_upside_pct: upside,
        decision_score,
        rationale: recommendation.rationale(),
        driver_notes: signals.map(|s| s.note),
    }
}
