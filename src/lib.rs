//! Single-stock investment thesis and risk synthesis.
//!
//! A crude P/E valuation proxy, two hand-set risk proxies and a point-scoring
//! rule produce a BUY / HOLD / SELL call, rendered as a plain-text memo.

pub mod agent;
pub mod decision;
pub mod error;
pub mod memo;
pub mod policy;
pub mod risk;
pub mod stocks;
pub mod valuation;
