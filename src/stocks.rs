//! Market data snapshot and the Yahoo Finance adapter.
//!
//! This module handles:
//! - The fixed-shape `MarketMetrics` record every later stage consumes
//! - Normalizing a Yahoo `quoteSummary` document into that record
//! - Fetching the document over HTTP, absorbing any failure as missing data

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const QUOTE_SUMMARY_MODULES: &str = "price,summaryProfile,summaryDetail,financialData";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
// Error pages are often full HTML documents; keep only the head of the body.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// One snapshot of the metrics the agent reasons about.
///
/// Every numeric field is `None` when the provider did not report it. Nothing
/// here is ever filled in with a made-up number.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMetrics {
    pub company_name: String,
    pub sector: String,
    pub share_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    /// Fraction, e.g. 0.05 for 5%.
    pub revenue_growth: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

impl MarketMetrics {
    /// Snapshot for a ticker the provider told us nothing about.
    pub fn unavailable(ticker: &str) -> Self {
        Self {
            company_name: ticker.to_string(),
            sector: "N/A".to_string(),
            share_price: None,
            market_cap: None,
            trailing_pe: None,
            revenue_growth: None,
            free_cash_flow: None,
            debt_to_equity: None,
        }
    }

    /// Build a snapshot from a `quoteSummary` response body.
    ///
    /// Any shape the adapter does not recognise simply yields absent fields.
    pub fn from_quote_summary(ticker: &str, json: &Value) -> Self {
        let result = &json["quoteSummary"]["result"][0];
        let price = &result["price"];
        let profile = &result["summaryProfile"];
        let detail = &result["summaryDetail"];
        let financial = &result["financialData"];

        let company_name = non_empty_str(&price["shortName"])
            .or_else(|| non_empty_str(&price["longName"]))
            .unwrap_or(ticker)
            .to_string();
        let sector = non_empty_str(&profile["sector"]).unwrap_or("N/A").to_string();

        Self {
            company_name,
            sector,
            share_price: raw_number(&financial["currentPrice"])
                .or_else(|| raw_number(&price["regularMarketPrice"])),
            market_cap: raw_number(&price["marketCap"])
                .or_else(|| raw_number(&detail["marketCap"])),
            trailing_pe: raw_number(&detail["trailingPE"]),
            revenue_growth: raw_number(&financial["revenueGrowth"]),
            free_cash_flow: raw_number(&financial["freeCashflow"]),
            debt_to_equity: raw_number(&financial["debtToEquity"]),
        }
    }

    /// Number of numeric fields the provider actually reported.
    pub fn reported_fields(&self) -> usize {
        [
            self.share_price,
            self.market_cap,
            self.trailing_pe,
            self.revenue_growth,
            self.free_cash_flow,
            self.debt_to_equity,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

// Yahoo wraps numbers as {"raw": 1.23, "fmt": "1.23"}; older payloads use bare numbers.
fn raw_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Object(map) => map.get("raw")?.as_f64()?,
        other => other.as_f64()?,
    };
    n.is_finite().then_some(n)
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn non_empty_str(v: &Value) -> Option<&str> {
    v.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Connection settings for the market data provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Page requested first to obtain session cookies. `None` skips it.
    pub cookie_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: Some(DEFAULT_COOKIE_URL.to_string()),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    /// Settings for a provider at `base_url` with no cookie priming.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie_url: None,
            ..Self::default()
        }
    }
}

/// Yahoo Finance `quoteSummary` client.
pub struct YahooClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl YahooClient {
    pub fn new(config: ProviderConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch a snapshot for `ticker`. Never fails: transport errors, bad
    /// statuses and unreadable bodies all come back as an empty snapshot.
    pub async fn fetch(&self, ticker: &str) -> MarketMetrics {
        info!("[FETCH] requesting market data for {}", ticker);
        match self.fetch_quote_summary(ticker).await {
            Ok(json) => {
                let metrics = MarketMetrics::from_quote_summary(ticker, &json);
                info!(
                    "[FETCH] {} ({}): {}/6 numeric fields reported",
                    metrics.company_name,
                    ticker,
                    metrics.reported_fields()
                );
                metrics
            }
            Err(e) => {
                warn!("[FETCH] market data unavailable for {}: {}", ticker, e);
                MarketMetrics::unavailable(ticker)
            }
        }
    }

    async fn fetch_quote_summary(&self, ticker: &str) -> Result<Value, FetchError> {
        let crumb = self.session_crumb().await;

        let url = format!("{}/v10/finance/quoteSummary/{}", self.config.base_url, ticker);
        let mut query = vec![("modules", QUOTE_SUMMARY_MODULES.to_string())];
        if let Some(c) = crumb {
            query.push(("crumb", c));
        }

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(resp.json::<Value>().await?)
    }

    // Best-effort cookie + crumb handshake; `None` when no crumb could be obtained.
    async fn session_crumb(&self) -> Option<String> {
        if let Some(cookie_url) = &self.config.cookie_url {
            if let Err(e) = self.client.get(cookie_url).send().await {
                debug!("cookie request to {} failed: {}", cookie_url, e);
            }
        }

        let url = format!("{}/v1/test/getcrumb", self.config.base_url);
        let resp = match self.client.get(&url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!("crumb request returned {}", r.status());
                return None;
            }
            Err(e) => {
                debug!("crumb request failed: {}", e);
                return None;
            }
        };

        let crumb = resp.text().await.ok()?;
        let crumb = crumb.trim();
        if crumb.is_empty() || crumb.contains('<') || crumb.contains(char::is_whitespace) {
            return None;
        }
        Some(crumb.to_string())
    }
}
