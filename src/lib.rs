//! Subdomain takeover detection engine.
//!
//! This crate is the core described in `spec.md`/`SPEC_FULL.md`: given a
//! set of already-enumerated, already-normalized hostnames belonging to a
//! target apex, it analyzes each one for hijackable DNS delegation
//! (dangling CNAME/NS targets, cloud IPs gone cold) and produces a
//! [`Finding`] per hostname plus aggregate [`ScanStats`]. Subdomain
//! enumeration, report rendering, and CLI argument parsing are all
//! deliberately out of scope (`spec.md` §1) — callers (this crate's own
//! thin [`cli`] binary, or an external collaborator) own those.
//!
//! The five cooperating components (`spec.md` §2) map onto modules:
//!
//! - [`providers`] — C1, the static hijack-prone service catalog.
//! - [`dns`] — C2, CNAME/A/NS resolution, wildcard detection, caching.
//! - [`probe`] — C3, HTTP(S) fetch and TLS certificate extraction.
//! - [`detector`] — C4, the ten-stage per-hostname pipeline and [`Finding`].
//! - [`scheduler`] — C5, the bounded-parallel driver, rate limiting, and
//!   cooperative cancellation.
//!
//! [`run_scan`] wires all five together from a [`ScanConfig`] and is the
//! entry point a caller (including [`cli`]) actually calls.

pub mod cli;
pub mod confidence;
pub mod config;
pub mod detector;
pub mod dns;
pub mod error;
pub mod probe;
pub mod providers;
pub mod scheduler;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

pub use config::ScanConfig;
pub use detector::{verdict::Verdict, Detector, Finding};
pub use error::{DetectorError, Result};
pub use providers::RiskLevel;
pub use scheduler::{cancel_token, CancelToken, ScanStats, Scheduler};

/// Assembles the C1-C5 collaborators from `config` and drives `hostnames`
/// through them (`spec.md` §6 External Interfaces: `ScanConfig` in,
/// `Vec<Finding>` + `ScanStats` out). DNS and HTTP/TLS each get their own
/// rate limiter — they are distinct service classes (`spec.md` §4.5).
///
/// `progress` receives a side-channel line every ten completions; `cancel`
/// is watched for cooperative cancellation (`spec.md` §5) — pass the
/// receiver half of [`cancel_token`] if the caller has no cancellation
/// source of its own.
pub async fn run_scan(
    config: &ScanConfig,
    hostnames: Vec<String>,
    progress: Option<mpsc::UnboundedSender<String>>,
    cancel: watch::Receiver<bool>,
) -> Result<(Vec<Finding>, ScanStats)> {
    let dns_limiter = Arc::new(scheduler::rate_limiter::RateLimiter::new(config.rate_limit_per_sec));
    let http_limiter = Arc::new(scheduler::rate_limiter::RateLimiter::new(config.rate_limit_per_sec));

    let hickory = dns::HickoryResolver::new(config.dns_timeout)?;
    let composite = dns::CompositeResolver::new(hickory);
    let resolver: Arc<dyn dns::DnsResolver> =
        Arc::new(dns::RateLimitedResolver::new(Arc::new(composite), dns_limiter));

    let http_prober = Arc::new(
        probe::HttpProber::new(config.http_timeout)?.with_rate_limiter(Arc::clone(&http_limiter)),
    );
    let tls_prober = Arc::new(probe::TlsProber::new(config.tls_timeout).with_rate_limiter(http_limiter));
    let wildcard = Arc::new(dns::WildcardCheck::new());

    let detector = Arc::new(Detector::new(resolver, http_prober, tls_prober, wildcard, &config.apex));
    let scheduler = Scheduler::new(config.concurrency, config.cancellation_deadline());

    Ok(scheduler.run(detector, hostnames, progress, cancel).await)
}

/// Process exit code for a completed (non-cancelled) scan (`spec.md` §7):
/// 2 if at least one `CONFIRMED`/`HIGHLY_LIKELY` Finding was produced, 0
/// otherwise. The 1 (couldn't run) and 130 (cancelled) cases are the
/// caller's to detect before/around calling [`run_scan`].
pub fn exit_code_for(stats: &ScanStats) -> i32 {
    if stats.actionable_count() > 0 {
        2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn run_scan_wires_everything_and_returns_one_finding_per_host() {
        let config = ScanConfig::new("example.invalid")
            .with_concurrency(4)
            .with_rate_limit(100)
            .with_http_timeout(Duration::from_millis(50));
        let (_tx, rx) = cancel_token();

        let (findings, stats) = run_scan(&config, vec!["plain.example.invalid".to_string()], None, rx)
            .await
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(stats.verdict_counts.values().sum::<usize>(), 1);
    }

    #[test]
    fn exit_code_is_2_when_any_finding_is_actionable() {
        let mut stats = ScanStats::default();
        stats.verdict_counts.insert("CONFIRMED".to_string(), 1);
        assert_eq!(exit_code_for(&stats), 2);
    }

    #[test]
    fn exit_code_is_0_when_nothing_is_actionable() {
        let stats = ScanStats::default();
        assert_eq!(exit_code_for(&stats), 0);
    }
}
