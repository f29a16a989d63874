//! Error types for the thesis agent.
//!
//! Only policy loading and memo persistence may end a run. Gaps in market
//! data never become errors here; they travel as `None` through the pipeline.
//!
//! Messages name the failing path only; the underlying cause is reachable
//! through `source()` so `anyhow` prints it once under "Caused by".

use std::path::PathBuf;
use thiserror::Error;

/// Policy file could not be turned into a usable [`crate::policy::Policy`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("policy file '{}' is not valid JSON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("policy file '{}' is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Failure talking to the market data provider. Absorbed by the adapter.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Fatal errors surfaced to the caller of [`crate::agent::run`].
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write memo to '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
