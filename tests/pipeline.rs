use std::fs;
use std::path::Path;

use thesis_agent::agent::{self, run_with_metrics};
use thesis_agent::decision::{Conviction, Recommendation, RiskLevel};
use thesis_agent::error::{AgentError, ConfigError};
use thesis_agent::policy::Policy;
use thesis_agent::stocks::{MarketMetrics, ProviderConfig};

fn write_policy(dir: &Path, json: &str) -> Policy {
    let path = dir.join("policy.json");
    fs::write(&path, json).unwrap();
    Policy::load(&path).unwrap()
}

fn tech_metrics() -> MarketMetrics {
    MarketMetrics {
        company_name: "Microsoft Corporation".to_string(),
        sector: "Technology".to_string(),
        share_price: Some(415.5),
        market_cap: Some(3.1e12),
        trailing_pe: Some(25.0),
        revenue_growth: Some(0.08),
        free_cash_flow: Some(1000.0),
        debt_to_equity: Some(100.0),
    }
}

#[test]
fn bull_scenario_is_moderate_conviction_buy() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(
        dir.path(),
        r#"{"pe_reference": 30, "min_upside_pct_for_buy": 10, "scenario": "bull"}"#,
    );
    let out = dir.path().join("outputs").join("memo.txt");

    let analysis = run_with_metrics(&policy, &tech_metrics(), &out).unwrap();
    let d = &analysis.decision;

    let upside = d.valuation_upside_pct.unwrap();
    assert!((upside - 20.0).abs() < 1e-9);
    assert!((d.risk_score - 0.45).abs() < 1e-12);
    assert_eq!(d.risk_level, RiskLevel::Medium);
    assert_eq!(d.decision_score, 3);
    assert_eq!(d.recommendation, Recommendation::Buy);
    assert_eq!(d.conviction, Conviction::Moderate);

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, analysis.memo);
    assert!(written.contains("Synthesis – Microsoft Corporation (MSFT)"));
    assert!(written.contains("approximately\n20.0%."));
    assert!(written.contains("BUY (Moderate conviction)"));
}

#[test]
fn missing_trailing_pe_is_narrated_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), r#"{"pe_reference": 30}"#);
    let metrics = MarketMetrics {
        trailing_pe: None,
        ..tech_metrics()
    };

    let analysis = run_with_metrics(&policy, &metrics, &dir.path().join("memo.txt")).unwrap();
    assert_eq!(analysis.decision.valuation_upside_pct, None);
    assert!(analysis.decision.driver_notes[0].contains("unavailable"));
    assert!(analysis.memo.contains("- Trailing P/E: N/A\n"));
    assert!(analysis.memo.contains("approximately\nN/A."));
}

#[test]
fn zero_reference_multiple_yields_no_upside() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), r#"{"pe_reference": 0}"#);

    let analysis = run_with_metrics(&policy, &tech_metrics(), &dir.path().join("memo.txt")).unwrap();
    assert_eq!(analysis.decision.valuation_upside_pct, None);
    assert!(analysis.decision.driver_notes[0].contains("unavailable"));
}

#[test]
fn identical_inputs_give_identical_memos() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), r#"{"pe_reference": 28, "scenario": "bear"}"#);
    let first = dir.path().join("a.txt");
    let second = dir.path().join("b.txt");

    run_with_metrics(&policy, &tech_metrics(), &first).unwrap();
    run_with_metrics(&policy, &tech_metrics(), &second).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

    // rerunning overwrites in place
    run_with_metrics(&policy, &tech_metrics(), &first).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn unwritable_output_is_fatal_and_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), r#"{"pe_reference": 30}"#);
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let out = blocker.join("memo.txt");

    let err = run_with_metrics(&policy, &tech_metrics(), &out).unwrap_err();
    assert!(matches!(err, AgentError::Output { .. }));
    assert!(err.to_string().contains("memo.txt"));
}

#[tokio::test]
async fn missing_policy_aborts_before_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("memo.txt");
    // Unroutable provider: the run must fail on the policy before any request.
    let provider = ProviderConfig::with_base_url("http://127.0.0.1:9");

    let err = agent::run(&dir.path().join("nope.json"), &out, provider)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Config(ConfigError::Read { .. })));
    assert!(err.to_string().contains("nope.json"));
    assert!(!out.exists());
}

#[tokio::test]
async fn malformed_policy_leaves_no_memo() {
    let dir = tempfile::tempdir().unwrap();
    let policy_path = dir.path().join("policy.json");
    fs::write(&policy_path, "{\"pe_reference\": ").unwrap();
    let out = dir.path().join("memo.txt");

    let err = agent::run(&policy_path, &out, ProviderConfig::with_base_url("http://127.0.0.1:9"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Config(ConfigError::Parse { .. })));
    assert!(!out.exists());
}

#[test]
fn shipped_policy_loads() {
    let policy = Policy::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("data/valuation_inputs.json")).unwrap();
    assert_eq!(policy.ticker, "MSFT");
    assert_eq!(policy.pe_reference, Some(30.0));
}
