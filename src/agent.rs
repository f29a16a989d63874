//! End-to-end pipeline: policy -> market data -> valuation + risk -> decision
//! -> memo on disk.

use std::path::Path;
use tracing::{info, warn};

use crate::decision::{decide, Decision};
use crate::error::AgentError;
use crate::memo::{render, write_memo};
use crate::policy::Policy;
use crate::risk::assess_risk;
use crate::stocks::{MarketMetrics, ProviderConfig, YahooClient};
use crate::valuation::estimate_upside;

/// Decision plus the memo rendered from it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub decision: Decision,
    pub memo: String,
}

/// Score a metrics snapshot under `policy` and render the memo. No I/O.
pub fn analyze(policy: &Policy, metrics: &MarketMetrics) -> Analysis {
    let upside = estimate_upside(metrics.trailing_pe, policy.pe_reference);
    match upside {
        Some(u) => info!("[VALUATION] implied upside {:.1}%", u),
        None => info!("[VALUATION] upside unavailable"),
    }

    let risk = assess_risk(policy.scenario, &metrics.sector);
    let decision = decide(metrics, upside, &risk, policy);
    info!(
        "[DECISION] {} ({} conviction), score={}, risk={} ({:.3})",
        decision.recommendation,
        decision.conviction,
        decision.decision_score,
        decision.risk_level,
        decision.risk_score
    );

    let memo = render(metrics, &decision, &policy.ticker);
    Analysis { decision, memo }
}

/// Analyze an already-fetched snapshot and persist the memo to `output_path`.
pub fn run_with_metrics(
    policy: &Policy,
    metrics: &MarketMetrics,
    output_path: &Path,
) -> Result<Analysis, AgentError> {
    let analysis = analyze(policy, metrics);

    write_memo(output_path, &analysis.memo).map_err(|source| AgentError::Output {
        path: output_path.to_path_buf(),
        source,
    })?;
    info!("[MEMO] written to {}", output_path.display());

    Ok(analysis)
}

/// Full run: load the policy, fetch market data, decide, write the memo.
pub async fn run(
    policy_path: &Path,
    output_path: &Path,
    provider: ProviderConfig,
) -> Result<Analysis, AgentError> {
    let policy = Policy::load(policy_path)?;
    info!(
        "[POLICY] {} loaded from {} (scenario={})",
        policy.ticker,
        policy_path.display(),
        policy.scenario
    );

    let metrics = match YahooClient::new(provider) {
        Ok(client) => client.fetch(&policy.ticker).await,
        Err(e) => {
            warn!("[FETCH] could not build HTTP client: {}", e);
            MarketMetrics::unavailable(&policy.ticker)
        }
    };

    run_with_metrics(&policy, &metrics, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Recommendation;

    #[test]
    fn analyze_is_deterministic() {
        let policy = Policy {
            pe_reference: Some(30.0),
            ..Policy::default()
        };
        let metrics = MarketMetrics {
            trailing_pe: Some(32.0),
            revenue_growth: Some(0.12),
            ..MarketMetrics::unavailable("MSFT")
        };

        let a = analyze(&policy, &metrics);
        let b = analyze(&policy, &metrics);
        assert_eq!(a.memo, b.memo);
        assert_eq!(a.decision, b.decision);
        assert_eq!(a.decision.recommendation, Recommendation::Sell);
    }
}
