//! Hand-set risk proxies.

use crate::policy::{RiskWeights, Scenario};

const AI_CAPEX_BULL: f64 = 0.40;
const AI_CAPEX_BEAR: f64 = 0.70;
const AI_CAPEX_BASE: f64 = 0.55;
const REGULATORY_TECH: f64 = 0.50;
const REGULATORY_OTHER: f64 = 0.35;

/// The two risk proxies, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    /// Capital-intensity risk from heavy AI investment.
    pub ai_capex: f64,
    pub regulatory: f64,
}

impl RiskAssessment {
    /// Weighted risk score used by the decision overlay.
    pub fn weighted_score(&self, weights: &RiskWeights) -> f64 {
        self.ai_capex * weights.ai_capex + self.regulatory * weights.regulatory
    }
}

/// Derive risk proxies from the policy scenario and the company's sector.
pub fn assess_risk(scenario: Scenario, sector: &str) -> RiskAssessment {
    let ai_capex = match scenario {
        Scenario::Bull => AI_CAPEX_BULL,
        Scenario::Bear => AI_CAPEX_BEAR,
        Scenario::Base => AI_CAPEX_BASE,
    };

    let regulatory = if sector.eq_ignore_ascii_case("technology") {
        REGULATORY_TECH
    } else {
        REGULATORY_OTHER
    };

    RiskAssessment { ai_capex, regulatory }
}
