//! Takeover Detector (component C4) — the heart of the system. Given a
//! hostname, runs the ten-stage pipeline from `spec.md` §4.4 and produces a
//! single [`Finding`], never raising: every failure becomes evidence or a
//! downgraded signal (`spec.md` §7).

pub mod state;
pub mod verdict;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::confidence::{self, evidence, Signals};
use crate::dns::resolver::{ClassifyResult, DnsResolver};
use crate::dns::wildcard::WildcardCheck;
use crate::probe::{HttpProber, TlsProber};
use crate::providers::{self, Provider, RiskLevel};
use state::DetectorStage;
pub use verdict::Verdict;

const MAX_EVIDENCE_ITEMS: usize = 20;

/// One analyzed hostname, populated in-order by the pipeline and frozen at
/// completion (`spec.md` §3). All fields are public and serializable so a
/// reporting collaborator can consume this directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub subdomain: String,

    // DNS signals
    pub cname: Option<String>,
    pub cname_chain: Vec<String>,
    pub a_records: Vec<String>,
    pub ns_records: Vec<String>,
    pub dangling_ns: Vec<String>,
    pub dangling_cname_chain_links: Vec<String>,

    // HTTP signals
    pub http_status: Option<u16>,
    pub https_status: Option<u16>,
    pub final_url: Option<String>,
    pub body: Option<String>,
    pub page_title: Option<String>,
    pub response_time_ms: Option<u64>,
    pub headers: HashMap<String, String>,
    pub is_live: bool,

    // TLS signals
    pub ssl_cert_cn: Option<String>,
    pub ssl_mismatch: bool,

    // Derived
    pub provider: Option<String>,
    pub header_fingerprint_provider: Option<String>,
    pub dangling_a_record: bool,
    pub nxdomain_cname: bool,
    pub ns_takeover: bool,
    pub confidence: u8,
    pub verdict: Verdict,
    pub risk_level: RiskLevel,
    pub evidence: Vec<String>,
    pub verification_steps: Vec<String>,
}

impl Finding {
    fn empty(subdomain: &str) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            cname: None,
            cname_chain: Vec::new(),
            a_records: Vec::new(),
            ns_records: Vec::new(),
            dangling_ns: Vec::new(),
            dangling_cname_chain_links: Vec::new(),
            http_status: None,
            https_status: None,
            final_url: None,
            body: None,
            page_title: None,
            response_time_ms: None,
            headers: HashMap::new(),
            is_live: false,
            ssl_cert_cn: None,
            ssl_mismatch: false,
            provider: None,
            header_fingerprint_provider: None,
            dangling_a_record: false,
            nxdomain_cname: false,
            ns_takeover: false,
            confidence: 0,
            verdict: Verdict::Safe,
            risk_level: RiskLevel::Info,
            evidence: Vec::new(),
            verification_steps: Vec::new(),
        }
    }

    fn push_evidence(&mut self, line: String) {
        if self.evidence.len() < MAX_EVIDENCE_ITEMS {
            self.evidence.push(line);
        }
    }

    fn into_error(mut self, message: &str) -> Self {
        self.verdict = Verdict::Error;
        self.confidence = 0;
        self.push_evidence(evidence::analysis_error(message));
        self
    }

    fn into_cancelled(mut self) -> Self {
        self.verdict = Verdict::Error;
        self.confidence = 0;
        self.push_evidence(evidence::cancelled());
        self
    }

    /// A terminal `ERROR` Finding for a hostname whose detector run was
    /// cancelled before completing (`spec.md` §5 Cancellation, §7).
    pub fn cancelled(subdomain: &str) -> Self {
        Self::empty(subdomain).into_cancelled()
    }

    /// A terminal `ERROR` Finding for a hostname whose detector run aborted
    /// unrecoverably (`spec.md` §7: "Unrecoverable detector exception"). The
    /// Concurrency Controller is the only caller — it catches panics at the
    /// single outermost per-subdomain call site (SPEC_FULL §7) so one bad
    /// hostname can never abort the scan.
    pub fn errored(subdomain: &str, message: &str) -> Self {
        Self::empty(subdomain).into_error(message)
    }
}

fn is_dangling(classification: ClassifyResult) -> bool {
    matches!(classification, ClassifyResult::NxDomain | ClassifyResult::NoNameservers)
}

/// Advances `stage` to `next`, asserting the transition is legal per the
/// §4.4 state machine. Debug-only: a release build trusts the pipeline
/// below to call this in the right order rather than paying for the check.
fn advance_stage(stage: &mut DetectorStage, next: DetectorStage) {
    debug_assert!(
        stage.can_advance_to(next),
        "illegal detector stage transition: {stage:?} -> {next:?}"
    );
    *stage = next;
}

/// Bundles the collaborators a [`Detector`] needs so the scheduler can
/// construct them once per scan and share them across every pipeline run.
pub struct Detector {
    resolver: Arc<dyn DnsResolver>,
    http_prober: Arc<HttpProber>,
    tls_prober: Arc<TlsProber>,
    wildcard: Arc<WildcardCheck>,
    apex: String,
}

impl Detector {
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        http_prober: Arc<HttpProber>,
        tls_prober: Arc<TlsProber>,
        wildcard: Arc<WildcardCheck>,
        apex: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            http_prober,
            tls_prober,
            wildcard,
            apex: apex.into(),
        }
    }

    /// Runs the full ten-stage pipeline for `subdomain`. Never panics under
    /// normal operation; the scheduler additionally wraps this call in
    /// `catch_unwind` (`spec.md` §7, SPEC_FULL §7) as a last line of defense.
    pub async fn analyze(&self, subdomain: &str) -> Finding {
        let mut finding = Finding::empty(subdomain);
        let mut stage = DetectorStage::New;

        // Stage 1 — DNS.
        let cname_chain = self.resolver.resolve_cname(subdomain).await;
        finding.cname = cname_chain.head.clone();
        finding.cname_chain = cname_chain.chain.clone();
        finding.a_records = self.resolver.resolve_a(subdomain).await;
        finding.ns_records = self.resolver.resolve_ns(subdomain).await;
        advance_stage(&mut stage, DetectorStage::DnsDone);
        debug!(%subdomain, ?stage, "dns stage complete");

        // Stage 4 (dangling checks run before the early exit needs them).
        let head_classification = match &finding.cname {
            Some(head) => self.resolver.classify_target(head).await,
            None => ClassifyResult::Exists,
        };
        finding.nxdomain_cname = finding.cname.is_some() && is_dangling(head_classification);

        let mut dangling_links = Vec::new();
        for link in finding.cname_chain.iter().skip(1) {
            if is_dangling(self.resolver.classify_target(link).await) {
                dangling_links.push(link.clone());
            }
        }
        finding.dangling_cname_chain_links = dangling_links;

        let mut dangling_ns = Vec::new();
        for ns in &finding.ns_records {
            if is_dangling(self.resolver.classify_target(ns).await) {
                dangling_ns.push(ns.clone());
            }
        }
        finding.dangling_ns = dangling_ns;
        finding.ns_takeover = !finding.dangling_ns.is_empty();

        let cloud_owner = finding.a_records.iter().find_map(|ip| providers::classify_ip(ip));

        // Stage 2 — Early exit.
        if finding.cname.is_none() && !finding.ns_takeover && cloud_owner.is_none() {
            advance_stage(&mut stage, DetectorStage::Safe);
            finding.verdict = Verdict::Safe;
            finding.risk_level = RiskLevel::Info;
            finding.push_evidence(evidence::no_relevant_dns_signals());
            advance_stage(&mut stage, DetectorStage::Classified);
            return finding;
        }

        // Stage 3 — Provider identification (CNAME-derived).
        let mut provider: Option<&'static Provider> =
            providers::identify_by_cname(finding.cname.as_deref(), &finding.cname_chain);
        finding.provider = provider.map(|p| p.name.to_string());
        advance_stage(&mut stage, DetectorStage::ProviderKnown);

        // Stage 5 — HTTP probe.
        let http_outcome = self.http_prober.probe(subdomain).await;
        finding.is_live = http_outcome.is_live();
        finding.http_status = http_outcome.http_attempt.as_ref().map(|a| a.status);
        finding.https_status = http_outcome.https_attempt.as_ref().map(|a| a.status);
        if let Some(primary) = http_outcome.primary() {
            finding.final_url = Some(primary.url.clone());
            finding.body = Some(primary.body.clone());
            finding.page_title = primary.title.clone();
            finding.response_time_ms = Some(primary.elapsed.as_millis() as u64);
            finding.headers = primary.headers.clone();
        }
        advance_stage(&mut stage, DetectorStage::Probed);
        debug!(%subdomain, ?stage, is_live = finding.is_live, "probe stage complete");

        // Stage 6 — Header fingerprint.
        let header_provider = providers::identify_by_headers(&finding.headers);
        finding.header_fingerprint_provider = header_provider.map(|p| p.name.to_string());
        let mut header_fingerprint_is_independent_evidence = false;
        if provider.is_none() {
            if let Some(p) = header_provider {
                provider = Some(p);
                finding.provider = Some(p.name.to_string());
            }
        } else if header_provider.is_some() {
            header_fingerprint_is_independent_evidence = true;
        }

        // Stage 4 (continued) — dangling A record, now that is_live is known.
        if !finding.a_records.is_empty() && !finding.is_live {
            finding.dangling_a_record = cloud_owner.is_some();
        }

        // Stage 7 — TLS probe.
        let (cert, ssl_mismatch) = self.tls_prober.probe(subdomain, 443).await;
        finding.ssl_cert_cn = cert.and_then(|c| c.common_name);
        finding.ssl_mismatch = ssl_mismatch;

        // Stage 8 — Confidence aggregation.
        let wildcard_detected = if self.apex.is_empty() {
            false
        } else {
            self.wildcard.get(self.resolver.as_ref(), &self.apex).await
        };

        let status_matched_expected = provider.and_then(|p| {
            [finding.http_status, finding.https_status]
                .into_iter()
                .flatten()
                .find(|status| p.expected_status.contains(status))
        });

        let error_pattern_matched = provider.and_then(|p| {
            finding
                .body
                .as_deref()
                .and_then(|body| p.body_error_markers.iter().find(|marker| body.contains(*marker)))
                .copied()
        });

        let claimed_marker_matched = provider.and_then(|p| {
            finding
                .body
                .as_deref()
                .and_then(|body| p.claimed_markers.iter().find(|marker| body.contains(*marker)))
                .copied()
        });

        let signals = Signals {
            ns_takeover: finding.ns_takeover,
            dangling_ns: &finding.dangling_ns,
            nxdomain_cname: finding.nxdomain_cname,
            dangling_chain_link_count: finding.dangling_cname_chain_links.len(),
            status_matched_expected,
            error_pattern_matched,
            claimed_marker_matched,
            body_available: finding.body.is_some(),
            ssl_mismatch: finding.ssl_mismatch,
            dangling_a_record: finding.dangling_a_record,
            is_live: finding.is_live,
            wildcard_detected,
            provider_can_takeover: provider.map(|p| p.can_takeover),
        };

        let score = confidence::score(&signals);
        finding.confidence = score.confidence;
        for line in score.evidence {
            finding.push_evidence(line);
        }
        if header_fingerprint_is_independent_evidence {
            if let Some(p) = header_provider {
                finding.push_evidence(evidence::header_fingerprint(p.name));
            }
        }
        advance_stage(&mut stage, DetectorStage::Scored);

        // Stage 9 — Verdict.
        finding.verdict = Verdict::threshold_bucket(finding.confidence, provider.is_some());
        finding.risk_level = finding.verdict.risk_level();
        advance_stage(&mut stage, DetectorStage::Classified);
        debug!(%subdomain, ?stage, confidence = finding.confidence, verdict = %finding.verdict, "classified");

        // Stage 10 — Verification steps.
        if finding.verdict.is_actionable() || finding.verdict == Verdict::Possible {
            finding.verification_steps = verdict::verification_steps(
                finding.ns_takeover,
                finding.provider.as_deref(),
                finding.cname.as_deref(),
            );
        }

        finding
    }

    /// Runs [`Self::analyze`] under a cancellation deadline (`spec.md` §5):
    /// `timeout + 2s`. A timed-out run produces an `ERROR` Finding with
    /// evidence `"cancelled"` rather than propagating.
    pub async fn analyze_with_deadline(&self, subdomain: &str, deadline: Duration) -> Finding {
        match tokio::time::timeout(deadline, self.analyze(subdomain)).await {
            Ok(finding) => finding,
            Err(_) => {
                warn!(%subdomain, "detector run exceeded cancellation deadline");
                Finding::empty(subdomain).into_cancelled()
            }
        }
    }
}
