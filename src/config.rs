//! Scan-wide configuration. The core never parses CLI flags or environment
//! variables itself — that is an external collaborator's job (see
//! `spec.md` §1) — but callers need somewhere to assemble the knobs §6
//! lists, so this module provides a plain struct with a teacher-style
//! `Default` impl and a small builder.

use std::time::Duration;

/// Configuration accepted by [`crate::scheduler::Scheduler`] and
/// [`crate::detector::Detector`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Apex domain the subdomains in this scan belong to. Used once per
    /// scan for the memoized wildcard check (§4.2, §4.4 Stage 8).
    pub apex: String,
    /// Maximum concurrent Detector pipelines (default 50).
    pub concurrency: usize,
    /// Calls/second allowed per external service class (default 10).
    pub rate_limit_per_sec: u32,
    /// Per-HTTP-request timeout (default 10s).
    pub http_timeout: Duration,
    /// Per-DNS-query timeout (default 5s).
    pub dns_timeout: Duration,
    /// Per-TLS-handshake timeout (default 5s).
    pub tls_timeout: Duration,
    /// Emit `tracing::debug!` diagnostics for every stage transition.
    pub debug: bool,
    /// Suppress progress reporting on the side channel.
    pub quiet: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            apex: String::new(),
            concurrency: 50,
            rate_limit_per_sec: 10,
            http_timeout: Duration::from_secs(10),
            dns_timeout: Duration::from_secs(5),
            tls_timeout: Duration::from_secs(5),
            debug: false,
            quiet: false,
        }
    }
}

impl ScanConfig {
    pub fn new(apex: impl Into<String>) -> Self {
        Self {
            apex: apex.into(),
            ..Self::default()
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_rate_limit(mut self, per_sec: u32) -> Self {
        self.rate_limit_per_sec = per_sec.max(1);
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Deadline applied when cancelling an in-flight detector (§5): the
    /// configured HTTP timeout plus a two-second grace period.
    pub fn cancellation_deadline(&self) -> Duration {
        self.http_timeout + Duration::from_secs(2)
    }
}
