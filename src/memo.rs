//! Investment memo rendering and persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::decision::Decision;
use crate::stocks::MarketMetrics;

const RULE: &str = "========================================";

fn fmt_pct(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{:.1}%", v),
        None => "N/A".to_string(),
    }
}

// Prices and ratios keep a decimal point (`25.0`).
fn fmt_ratio(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{:?}", v),
        None => "N/A".to_string(),
    }
}

// Money totals are whole numbers from the provider and print without one.
fn fmt_amount(x: Option<f64>) -> String {
    match x {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

/// Render the memo text. Pure substitution into a fixed template.
pub fn render(metrics: &MarketMetrics, decision: &Decision, ticker: &str) -> String {
    let revenue_growth_pct = metrics.revenue_growth.map(|g| g * 100.0);
    let drivers = decision
        .driver_notes
        .iter()
        .map(|note| format!("- {}", note))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{rule}\n\
         Investment Thesis & Risk Synthesis – {company} ({ticker})\n\
         {rule}\n\
         \n\
         Company Snapshot:\n\
         - Sector: {sector}\n\
         - Share Price: {price}\n\
         - Market Capitalization: {market_cap}\n\
         \n\
         Key Signals:\n\
         - Trailing P/E: {pe}\n\
         - Revenue Growth (YoY): {growth}\n\
         - Free Cash Flow: {fcf}\n\
         - Debt-to-Equity: {dte}\n\
         \n\
         Valuation View:\n\
         Using a simple valuation reference, the implied upside is approximately\n\
         {upside}. This provides a rough sense of\n\
         valuation rather than a precise estimate.\n\
         \n\
         Risk View:\n\
         Overall risk is assessed as {risk_level}. The main risks relate\n\
         to continued investment intensity and regulatory exposure. These risks do not\n\
         break the case, but argue against an aggressive position.\n\
         \n\
         Investment View:\n\
         {recommendation} ({conviction} conviction)\n\
         \n\
         What supports this view:\n\
         {rationale}\n\
         \n\
         Key Drivers:\n\
         {drivers}\n\
         \n\
         This memo is generated automatically using public market data and a transparent\n\
         set of decision rules. It is intended to support discussion rather than replace\n\
         deeper valuation work or analyst judgement.",
        rule = RULE,
        company = metrics.company_name,
        ticker = ticker,
        sector = metrics.sector,
        price = fmt_ratio(metrics.share_price),
        market_cap = fmt_amount(metrics.market_cap),
        pe = fmt_ratio(metrics.trailing_pe),
        growth = fmt_pct(revenue_growth_pct),
        fcf = fmt_amount(metrics.free_cash_flow),
        dte = fmt_ratio(metrics.debt_to_equity),
        upside = fmt_pct(decision.valuation_upside_pct),
        risk_level = decision.risk_level,
        recommendation = decision.recommendation,
        conviction = decision.conviction,
        rationale = decision.rationale,
        drivers = drivers,
    )
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `memo` to `path`, creating parent directories.
///
/// The text goes to a sibling temp file first and is renamed into place, so
/// the target is either fully replaced or left as it was.
pub fn write_memo(path: &Path, memo: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path_for(path);
    let result = fs::write(&tmp_path, memo.as_bytes()).and_then(|_| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
