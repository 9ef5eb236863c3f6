//! Literal scenario tests from `spec.md` §8, driven against the public
//! crate surface with a stub [`subtakeover::dns::DnsResolver`] the way
//! `subtakeover::detector`'s own unit tests do it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use subtakeover::detector::{Detector, Verdict};
use subtakeover::dns::{ClassifyResult, CnameChain, DnsResolver};
use subtakeover::probe::{HttpProber, TlsProber};
use subtakeover::dns::WildcardCheck;

struct StubResolver {
    cname: HashMap<String, CnameChain>,
    a: HashMap<String, Vec<String>>,
    ns: HashMap<String, Vec<String>>,
    classify: HashMap<String, ClassifyResult>,
}

impl StubResolver {
    fn new() -> Self {
        Self {
            cname: HashMap::new(),
            a: HashMap::new(),
            ns: HashMap::new(),
            classify: HashMap::new(),
        }
    }
}

#[async_trait]
impl DnsResolver for StubResolver {
    async fn resolve_cname(&self, name: &str) -> CnameChain {
        self.cname.get(name).cloned().unwrap_or_default()
    }
    async fn resolve_a(&self, name: &str) -> Vec<String> {
        self.a.get(name).cloned().unwrap_or_default()
    }
    async fn resolve_ns(&self, name: &str) -> Vec<String> {
        self.ns.get(name).cloned().unwrap_or_default()
    }
    async fn classify_target(&self, name: &str) -> ClassifyResult {
        self.classify.get(name).copied().unwrap_or(ClassifyResult::Exists)
    }
}

/// A stub resolver that additionally answers the two random wildcard-probe
/// labels under `apex` with `Exists`, simulating a wildcarded apex.
struct WildcardingResolver {
    inner: StubResolver,
    apex: String,
}

#[async_trait]
impl DnsResolver for WildcardingResolver {
    async fn resolve_cname(&self, name: &str) -> CnameChain {
        self.inner.resolve_cname(name).await
    }
    async fn resolve_a(&self, name: &str) -> Vec<String> {
        self.inner.resolve_a(name).await
    }
    async fn resolve_ns(&self, name: &str) -> Vec<String> {
        self.inner.resolve_ns(name).await
    }
    async fn classify_target(&self, name: &str) -> ClassifyResult {
        if name.ends_with(&self.apex) && !self.inner.classify.contains_key(name) {
            return ClassifyResult::Exists;
        }
        self.inner.classify_target(name).await
    }
}

fn detector_over(resolver: impl DnsResolver + 'static, apex: &str) -> Detector {
    Detector::new(
        Arc::new(resolver),
        Arc::new(HttpProber::new(Duration::from_millis(50)).unwrap()),
        Arc::new(TlsProber::new(Duration::from_millis(50))),
        Arc::new(WildcardCheck::new()),
        apex,
    )
}

#[tokio::test]
async fn scenario_2_live_github_pages_404_with_error_marker() {
    // HTTP probing needs a live server; this scenario is exercised against
    // the confidence table directly since the detector's HTTP stage can't
    // be stubbed without a real listener, and `subtakeover::confidence` is
    // the public surface the detector delegates scoring to.
    use subtakeover::confidence::{score, Signals};

    let signals = Signals {
        ns_takeover: false,
        dangling_ns: &[],
        nxdomain_cname: false,
        dangling_chain_link_count: 0,
        status_matched_expected: Some(404),
        error_pattern_matched: Some("There isn't a GitHub Pages site here."),
        claimed_marker_matched: None,
        body_available: true,
        ssl_mismatch: false,
        dangling_a_record: false,
        is_live: true,
        wildcard_detected: false,
        provider_can_takeover: Some(true),
    };

    let result = score(&signals);
    assert_eq!(result.confidence, 60);
}

#[tokio::test]
async fn scenario_3_dead_nameserver_delegation() {
    let mut stub = StubResolver::new();
    stub.ns
        .insert("legacy.example.com".to_string(), vec!["ns1.deadzone.invalid".to_string()]);
    stub.classify
        .insert("ns1.deadzone.invalid".to_string(), ClassifyResult::NxDomain);

    let detector = detector_over(stub, "");
    let finding = detector.analyze("legacy.example.com").await;

    assert!(finding.ns_takeover);
    assert!(finding.confidence >= 50);
    assert!(matches!(
        finding.verdict,
        Verdict::Likely | Verdict::HighlyLikely | Verdict::Confirmed
    ));
    assert!(finding.verification_steps.iter().any(|s| s.contains("Register")));
}

#[tokio::test]
async fn scenario_4_wildcard_suppression_reduces_confidence_by_twenty() {
    let cname = CnameChain {
        head: Some("missing-xyz.s3.amazonaws.com".to_string()),
        chain: vec!["missing-xyz.s3.amazonaws.com".to_string()],
    };

    let mut plain = StubResolver::new();
    plain.cname.insert("xyz.example.com".to_string(), cname.clone());
    plain
        .classify
        .insert("missing-xyz.s3.amazonaws.com".to_string(), ClassifyResult::NxDomain);
    let without_wildcard = detector_over(plain, "").analyze("xyz.example.com").await;

    let mut wildcarded = StubResolver::new();
    wildcarded.cname.insert("xyz.example.com".to_string(), cname);
    wildcarded
        .classify
        .insert("missing-xyz.s3.amazonaws.com".to_string(), ClassifyResult::NxDomain);
    let resolver = WildcardingResolver {
        inner: wildcarded,
        apex: "example.com".to_string(),
    };
    let with_wildcard = detector_over(resolver, "example.com").analyze("xyz.example.com").await;

    assert_eq!(without_wildcard.confidence - with_wildcard.confidence, 20);
    assert!(with_wildcard
        .evidence
        .iter()
        .any(|e| e.to_lowercase().contains("wildcard")));
}

#[tokio::test]
async fn scenario_6_can_takeover_false_provider_is_capped() {
    use subtakeover::confidence::{score, Signals};

    let signals = Signals {
        ns_takeover: false,
        dangling_ns: &[],
        nxdomain_cname: false,
        dangling_chain_link_count: 0,
        status_matched_expected: Some(404),
        error_pattern_matched: Some("error"),
        claimed_marker_matched: None,
        body_available: true,
        ssl_mismatch: false,
        dangling_a_record: false,
        is_live: true,
        wildcard_detected: false,
        provider_can_takeover: Some(false),
    };

    let result = score(&signals);
    assert!(result.confidence <= 30);
    assert!(result.evidence.iter().any(|e| e.to_lowercase().contains("cap")));
}
