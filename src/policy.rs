//! Decision policy loading.
//!
//! The policy file is a small JSON object with thresholds, weights and the
//! scenario tag the agent uses. Every key is optional; missing keys resolve to
//! the defaults below once, at load time, so the rest of the pipeline never
//! has to guess.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ConfigError;

pub const DEFAULT_TICKER: &str = "MSFT";
pub const DEFAULT_MIN_UPSIDE_PCT: f64 = 10.0;
pub const DEFAULT_RISK_WEIGHT: f64 = 0.5;
pub const DEFAULT_HIGH_RISK: f64 = 0.65;
pub const DEFAULT_MEDIUM_RISK: f64 = 0.45;

// Yahoo-style symbols: MSFT, BRK-B, RDS.A, ^GSPC, EURUSD=X
static TICKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9^][A-Za-z0-9.\-^=]{0,14}$").expect("ticker pattern is valid")
});

/// Market scenario used to pick the capital-intensity risk proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    Bull,
    Bear,
    #[default]
    Base,
}

impl Scenario {
    /// Case-insensitive parse. Anything that is not "bull" or "bear" is the
    /// base case; unknown tags are accepted on purpose.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "bull" => Scenario::Bull,
            "bear" => Scenario::Bear,
            _ => Scenario::Base,
        }
    }

    fn is_known(raw: &str) -> bool {
        matches!(raw.trim().to_lowercase().as_str(), "bull" | "bear" | "base")
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scenario::Bull => "bull",
            Scenario::Bear => "bear",
            Scenario::Base => "base",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RiskWeights {
    #[serde(default = "default_risk_weight", deserialize_with = "deserialize_number")]
    pub ai_capex: f64,
    #[serde(default = "default_risk_weight", deserialize_with = "deserialize_number")]
    pub regulatory: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            ai_capex: DEFAULT_RISK_WEIGHT,
            regulatory: DEFAULT_RISK_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_high_risk", deserialize_with = "deserialize_number")]
    pub high_risk: f64,
    #[serde(default = "default_medium_risk", deserialize_with = "deserialize_number")]
    pub medium_risk: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_risk: DEFAULT_HIGH_RISK,
            medium_risk: DEFAULT_MEDIUM_RISK,
        }
    }
}

fn default_risk_weight() -> f64 {
    DEFAULT_RISK_WEIGHT
}

fn default_high_risk() -> f64 {
    DEFAULT_HIGH_RISK
}

fn default_medium_risk() -> f64 {
    DEFAULT_MEDIUM_RISK
}

/// Resolved, validated decision policy. Read once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub ticker: String,
    /// Reference P/E multiple. `None` when the file omits it or gives
    /// something that is not a number.
    pub pe_reference: Option<f64>,
    pub min_upside_pct_for_buy: f64,
    pub risk_weights: RiskWeights,
    pub risk_thresholds: RiskThresholds,
    pub scenario: Scenario,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            pe_reference: None,
            min_upside_pct_for_buy: DEFAULT_MIN_UPSIDE_PCT,
            risk_weights: RiskWeights::default(),
            risk_thresholds: RiskThresholds::default(),
            scenario: Scenario::Base,
        }
    }
}

/// On-disk shape of the policy file, before defaults and validation.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pe_reference: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    min_upside_pct_for_buy: Option<f64>,
    #[serde(default)]
    risk_weights: RiskWeights,
    #[serde(default)]
    risk_thresholds: RiskThresholds,
    #[serde(default)]
    scenario: Option<String>,
}

// Thresholds and weights take numbers or numeric strings ("0.5"); anything
// else is a malformed policy.
fn number_from_value<E: serde::de::Error>(v: Value) -> Result<f64, E> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| E::custom("number out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
        other => Err(E::custom(format!("expected a number, got {}", other))),
    }
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    number_from_value(Value::deserialize(deserializer)?)
}

// `null` falls back to the default, like a missing key.
fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        v => number_from_value(v).map(Some),
    }
}

// Accept numbers and numeric strings; anything else means "no reference".
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let parsed = s.trim().parse::<f64>().ok();
            if parsed.is_none() {
                warn!("ignoring non-numeric pe_reference: {:?}", s);
            }
            parsed
        }
        Value::Null => None,
        other => {
            warn!("ignoring non-numeric pe_reference: {}", other);
            None
        }
    })
}

impl Policy {
    /// Load and validate the policy at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_json_str(&contents, path)?;
        debug!(path = %path.display(), ?policy, "policy loaded");
        Ok(policy)
    }

    /// Parse policy JSON. `origin` is only used to label errors.
    pub fn from_json_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: PolicyFile =
            serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;

        let invalid = |reason: String| ConfigError::Invalid {
            path: origin.to_path_buf(),
            reason,
        };

        let ticker = raw.ticker.unwrap_or_else(|| DEFAULT_TICKER.to_string());
        let ticker = ticker.trim().to_uppercase();
        if !TICKER_RE.is_match(&ticker) {
            return Err(invalid(format!("'{}' is not a valid ticker symbol", ticker)));
        }

        let min_upside_pct_for_buy = raw.min_upside_pct_for_buy.unwrap_or(DEFAULT_MIN_UPSIDE_PCT);
        if !min_upside_pct_for_buy.is_finite() {
            return Err(invalid("min_upside_pct_for_buy must be finite".to_string()));
        }

        for (name, w) in [
            ("ai_capex", raw.risk_weights.ai_capex),
            ("regulatory", raw.risk_weights.regulatory),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(invalid(format!("risk weight '{}' must be in [0, 1], got {}", name, w)));
            }
        }

        let t = raw.risk_thresholds;
        if !t.high_risk.is_finite() || !t.medium_risk.is_finite() {
            return Err(invalid("risk thresholds must be finite".to_string()));
        }
        if t.medium_risk > t.high_risk {
            return Err(invalid(format!(
                "medium_risk ({}) must not exceed high_risk ({})",
                t.medium_risk, t.high_risk
            )));
        }

        let scenario = match raw.scenario.as_deref() {
            Some(s) => {
                if !Scenario::is_known(s) {
                    warn!("unrecognized scenario '{}', using base case", s);
                }
                Scenario::parse_lenient(s)
            }
            None => Scenario::Base,
        };

        Ok(Policy {
            ticker,
            pe_reference: raw.pe_reference,
            min_upside_pct_for_buy,
            risk_weights: raw.risk_weights,
            risk_thresholds: t,
            scenario,
        })
    }
}
