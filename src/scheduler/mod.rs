//! Concurrency Controller (component C5, `spec.md` §4.5 / §5): drives a
//! set of candidate hostnames through a shared [`Detector`] under bounded
//! parallelism, with side-channel progress reporting and cooperative
//! cancellation. Per-service-class rate limiting is wired in at
//! construction time by wrapping the Detector's DNS/probe collaborators
//! (see [`rate_limiter::RateLimiter`]) rather than by this module —
//! the scheduler's own job is purely the bounded-parallel drive and result
//! aggregation.
//!
//! Grounded in the teacher's `DetectionEngine::detect_batch`, which drives
//! a `futures::stream` through `.buffer_unordered(workers)` for bounded
//! concurrency; this module generalizes that to carry cancellation and
//! progress alongside it.
//!
//! Each per-hostname pipeline additionally runs behind `catch_unwind`
//! (SPEC_FULL §7): a panicking detector run becomes an `ERROR` Finding for
//! that one hostname instead of aborting the whole scan.

pub mod cancel;
pub mod rate_limiter;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::error;

use crate::detector::{Detector, Finding};

pub use cancel::{cancel_token, CancelToken};

const PROGRESS_INTERVAL: usize = 10;

/// Aggregate statistics over one scan (`spec.md` §6: "a list of Findings
/// and aggregate statistics — counts per verdict, provider histogram,
/// count live, total duration").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub verdict_counts: HashMap<String, usize>,
    pub provider_histogram: HashMap<String, usize>,
    pub live_count: usize,
    pub total_duration: Duration,
}

impl ScanStats {
    fn record(&mut self, finding: &Finding) {
        *self
            .verdict_counts
            .entry(finding.verdict.to_string())
            .or_insert(0) += 1;
        if let Some(provider) = &finding.provider {
            *self.provider_histogram.entry(provider.clone()).or_insert(0) += 1;
        }
        if finding.is_live {
            self.live_count += 1;
        }
    }

    /// Count of `CONFIRMED` + `HIGHLY_LIKELY` findings, the threshold
    /// `spec.md` §7's exit-code policy (2 vs. 0) keys off.
    pub fn actionable_count(&self) -> usize {
        self.verdict_counts.get("CONFIRMED").copied().unwrap_or(0)
            + self.verdict_counts.get("HIGHLY_LIKELY").copied().unwrap_or(0)
    }
}

/// Drives a bounded-parallel sweep of hostnames through a shared
/// [`Detector`] (`spec.md` §4.5).
pub struct Scheduler {
    concurrency: usize,
    cancellation_deadline: Duration,
}

impl Scheduler {
    /// `concurrency` is the maximum number of in-flight Detector pipelines
    /// (default 50, §4.5); `cancellation_deadline` is the `timeout + 2s`
    /// grace period applied to each one (§5).
    pub fn new(concurrency: usize, cancellation_deadline: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cancellation_deadline,
        }
    }

    /// Runs every hostname in `hostnames` through `detector`, up to
    /// `self.concurrency` at a time. Findings are returned in completion
    /// order, not input order (`spec.md` §4.5: "Order is not a contract;
    /// tests must sort by subdomain"). `progress` receives a line every
    /// ten completions; `cancel` is watched by every in-flight pipeline,
    /// and a hostname still running when it fires gets an `ERROR` Finding
    /// with evidence `"cancelled"` instead of its real result.
    pub async fn run(
        &self,
        detector: Arc<Detector>,
        hostnames: Vec<String>,
        progress: Option<mpsc::UnboundedSender<String>>,
        cancel: watch::Receiver<bool>,
    ) -> (Vec<Finding>, ScanStats) {
        let start = Instant::now();
        let total = hostnames.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let deadline = self.cancellation_deadline;

        let findings: Vec<Finding> = stream::iter(hostnames)
            .map(|host| {
                let detector = Arc::clone(&detector);
                let completed = Arc::clone(&completed);
                let progress = progress.clone();
                let cancel = cancel.clone();
                async move {
                    let finding = tokio::select! {
                        biased;
                        _ = cancel::wait_for_cancel(cancel) => Finding::cancelled(&host),
                        f = AssertUnwindSafe(detector.analyze_with_deadline(&host, deadline)).catch_unwind() => {
                            f.unwrap_or_else(|_| {
                                error!(%host, "detector pipeline panicked");
                                Finding::errored(&host, "detector pipeline panicked")
                            })
                        }
                    };

                    let n = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if n % PROGRESS_INTERVAL == 0 {
                        if let Some(tx) = &progress {
                            let _ = tx.send(format!("{n}/{total} hostnames analyzed"));
                        }
                    }
                    finding
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut stats = ScanStats::default();
        for finding in &findings {
            stats.record(finding);
        }
        stats.total_duration = start.elapsed();

        (findings, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::resolver::{ClassifyResult, CnameChain, DnsResolver};
    use crate::probe::{HttpProber, TlsProber};
    use crate::dns::wildcard::WildcardCheck;
    use async_trait::async_trait;

    struct EmptyResolver;

    #[async_trait]
    impl DnsResolver for EmptyResolver {
        async fn resolve_cname(&self, _name: &str) -> CnameChain {
            CnameChain::default()
        }
        async fn resolve_a(&self, _name: &str) -> Vec<String> {
            Vec::new()
        }
        async fn resolve_ns(&self, _name: &str) -> Vec<String> {
            Vec::new()
        }
        async fn classify_target(&self, _name: &str) -> ClassifyResult {
            ClassifyResult::Exists
        }
    }

    fn test_detector() -> Arc<Detector> {
        Arc::new(Detector::new(
            Arc::new(EmptyResolver),
            Arc::new(HttpProber::new(Duration::from_millis(20)).unwrap()),
            Arc::new(TlsProber::new(Duration::from_millis(20))),
            Arc::new(WildcardCheck::new()),
            "",
        ))
    }

    #[tokio::test]
    async fn runs_every_hostname_and_tallies_stats() {
        let detector = test_detector();
        let hosts: Vec<String> = (0..25).map(|i| format!("host{i}.example.com")).collect();
        let scheduler = Scheduler::new(5, Duration::from_secs(1));
        let (_tx, rx) = cancel_token();

        let (findings, stats) = scheduler.run(detector, hosts.clone(), None, rx).await;

        assert_eq!(findings.len(), hosts.len());
        assert_eq!(stats.verdict_counts.values().sum::<usize>(), hosts.len());
    }

    #[tokio::test]
    async fn progress_fires_every_ten_completions() {
        let detector = test_detector();
        let hosts: Vec<String> = (0..23).map(|i| format!("host{i}.example.com")).collect();
        let scheduler = Scheduler::new(10, Duration::from_secs(1));
        let (_tx, rx) = cancel_token();
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

        let (findings, _stats) = scheduler.run(detector, hosts, Some(progress_tx), rx).await;
        assert_eq!(findings.len(), 23);

        let mut lines = Vec::new();
        while let Ok(line) = progress_rx.try_recv() {
            lines.push(line);
        }
        // 23 completions -> progress at 10 and 20.
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn cancellation_produces_error_findings() {
        let detector = test_detector();
        let hosts: Vec<String> = (0..5).map(|i| format!("host{i}.example.com")).collect();
        let scheduler = Scheduler::new(1, Duration::from_secs(30));
        let (tx, rx) = cancel_token();
        tx.cancel();

        let (findings, _stats) = scheduler.run(detector, hosts, None, rx).await;
        assert!(findings
            .iter()
            .all(|f| f.verdict == crate::detector::Verdict::Error));
    }

    struct PanickingResolver;

    #[async_trait]
    impl DnsResolver for PanickingResolver {
        async fn resolve_cname(&self, _name: &str) -> CnameChain {
            panic!("boom");
        }
        async fn resolve_a(&self, _name: &str) -> Vec<String> {
            Vec::new()
        }
        async fn resolve_ns(&self, _name: &str) -> Vec<String> {
            Vec::new()
        }
        async fn classify_target(&self, _name: &str) -> ClassifyResult {
            ClassifyResult::Exists
        }
    }

    #[tokio::test]
    async fn a_panicking_hostname_yields_an_error_finding_without_aborting_the_scan() {
        let detector = Arc::new(Detector::new(
            Arc::new(PanickingResolver),
            Arc::new(HttpProber::new(Duration::from_millis(20)).unwrap()),
            Arc::new(TlsProber::new(Duration::from_millis(20))),
            Arc::new(WildcardCheck::new()),
            "",
        ));
        let scheduler = Scheduler::new(4, Duration::from_secs(1));
        let (_tx, rx) = cancel_token();

        let (findings, _stats) = scheduler
            .run(detector, vec!["boom.example.com".to_string()], None, rx)
            .await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].verdict, crate::detector::Verdict::Error);
    }
}
