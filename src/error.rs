//! Crate-level error type for conditions that abort construction or a scan
//! outright. Per-hostname DNS/HTTP/TLS failures are not represented here —
//! they are tagged result variants (see `dns::ClassifyResult`,
//! `probe::http::HttpProbeOutcome`) that the detector folds into evidence
//! instead of propagating.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(#[source] reqwest::Error),

    #[error("failed to build TLS connector: {0}")]
    TlsConnectorBuild(#[source] openssl::error::ErrorStack),

    #[error("invalid hostname: {0}")]
    InvalidHostname(String),

    #[error("scan cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DetectorError>;
