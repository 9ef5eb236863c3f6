//! Confidence aggregation (component C4 scoring, `spec.md` §4.4 Stage 8).
//! The weight table is carried as data on [`Signals`] rather than branching
//! logic scattered through the detector — each row of the spec's table maps
//! to one field here and one `evidence` string, in the same order the spec
//! lists them.

pub mod evidence;

use serde::{Deserialize, Serialize};

/// Every input Stage 8 needs, collected by the detector pipeline stages
/// that precede scoring (§4.4 Stages 1-7). All fields are already the
/// *derived* boolean/count the table wants, not raw probe output.
#[derive(Debug, Clone, Default)]
pub struct Signals<'a> {
    pub ns_takeover: bool,
    pub dangling_ns: &'a [String],
    pub nxdomain_cname: bool,
    /// Count of dangling intermediate CNAME chain links, excluding the head
    /// (the head is scored separately via `nxdomain_cname`).
    pub dangling_chain_link_count: usize,
    pub status_matched_expected: Option<u16>,
    pub error_pattern_matched: Option<&'a str>,
    pub claimed_marker_matched: Option<&'a str>,
    /// Whether a response body was available to check claimed/error
    /// markers against at all. The claimed/no-claimed-marker rule also
    /// needs a provider to have been identified (`provider_can_takeover`
    /// is `Some`) — without one there's no marker list to have checked
    /// the body against, so neither the +10 nor -15 row applies.
    pub body_available: bool,
    pub ssl_mismatch: bool,
    pub dangling_a_record: bool,
    pub is_live: bool,
    pub wildcard_detected: bool,
    /// `None` when no provider was identified at all; scoring never caps
    /// in that case because there's no `can_takeover` flag to consult.
    pub provider_can_takeover: Option<bool>,
}

/// Result of Stage 8: the clamped confidence plus the ordered evidence
/// strings that justify it, one per contributing signal (`spec.md` §3
/// Invariants: "evidence length equals the number of signals contributed").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub confidence: u8,
    pub evidence: Vec<String>,
}

const NS_DELEGATION_WEIGHT: i32 = 50;
const NXDOMAIN_HEAD_WEIGHT: i32 = 40;
const CHAIN_LINK_WEIGHT: i32 = 35;
const CHAIN_LINK_CAP: i32 = 70;
const EXPECTED_STATUS_WEIGHT: i32 = 20;
const ERROR_PATTERN_WEIGHT: i32 = 30;
const NO_CLAIMED_MARKER_WEIGHT: i32 = 10;
const CLAIMED_MARKER_PENALTY: i32 = -15;
const SSL_MISMATCH_WEIGHT: i32 = 15;
const DANGLING_A_WEIGHT: i32 = 15;
const NO_HTTP_NXDOMAIN_WEIGHT: i32 = 10;
const WILDCARD_SUPPRESSION: i32 = -20;
const CANNOT_TAKEOVER_CAP: i32 = 30;

/// Applies the Stage 8 table to `signals`, in the order the spec lists rows,
/// and returns the clamped confidence plus the matching evidence trail.
pub fn score(signals: &Signals<'_>) -> ScoreResult {
    let mut total: i32 = 0;
    let mut trail = Vec::new();

    if signals.ns_takeover {
        total += NS_DELEGATION_WEIGHT;
        trail.push(evidence::ns_delegation(signals.dangling_ns));
    }

    if signals.nxdomain_cname {
        total += NXDOMAIN_HEAD_WEIGHT;
        trail.push(evidence::cname_nxdomain());
    }

    if signals.dangling_chain_link_count > 0 {
        let raw = signals.dangling_chain_link_count as i32 * CHAIN_LINK_WEIGHT;
        let contribution = raw.min(CHAIN_LINK_CAP);
        total += contribution;
        trail.push(evidence::chain_link_nxdomain(signals.dangling_chain_link_count));
    }

    if let Some(status) = signals.status_matched_expected {
        total += EXPECTED_STATUS_WEIGHT;
        trail.push(evidence::expected_status(status));
    }

    if let Some(pattern) = signals.error_pattern_matched {
        total += ERROR_PATTERN_WEIGHT;
        trail.push(evidence::error_pattern(pattern));
    }

    if signals.body_available && signals.provider_can_takeover.is_some() {
        if let Some(marker) = signals.claimed_marker_matched {
            total += CLAIMED_MARKER_PENALTY;
            trail.push(evidence::claimed_marker(marker));
        } else {
            total += NO_CLAIMED_MARKER_WEIGHT;
            trail.push(evidence::no_claimed_marker());
        }
    }

    if signals.ssl_mismatch {
        total += SSL_MISMATCH_WEIGHT;
        trail.push(evidence::ssl_mismatch());
    }

    if signals.dangling_a_record && !signals.is_live {
        total += DANGLING_A_WEIGHT;
        trail.push(evidence::dangling_a_record());
    }

    if !signals.is_live && signals.nxdomain_cname {
        total += NO_HTTP_NXDOMAIN_WEIGHT;
        trail.push(evidence::no_http_and_nxdomain());
    }

    if signals.wildcard_detected {
        total += WILDCARD_SUPPRESSION;
        trail.push(evidence::wildcard_suppression());
    }

    if signals.provider_can_takeover == Some(false) && !signals.ns_takeover && total > CANNOT_TAKEOVER_CAP {
        total = CANNOT_TAKEOVER_CAP;
        trail.push(evidence::cannot_take_over_cap());
    }

    ScoreResult {
        confidence: total.clamp(0, 100) as u8,
        evidence: trail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_1_cname_nxdomain_s3() {
        let signals = Signals {
            nxdomain_cname: true,
            is_live: false,
            provider_can_takeover: Some(true),
            ..Default::default()
        };
        let result = score(&signals);
        assert_eq!(result.confidence, 50);
        assert_eq!(result.evidence.len(), 2);
    }

    #[test]
    fn scenario_2_github_404_error_pattern() {
        let signals = Signals {
            status_matched_expected: Some(404),
            error_pattern_matched: Some("There isn't a GitHub Pages site here."),
            body_available: true,
            claimed_marker_matched: None,
            is_live: true,
            provider_can_takeover: Some(true),
            ..Default::default()
        };
        let result = score(&signals);
        assert_eq!(result.confidence, 60);
    }

    #[test]
    fn scenario_5_claimed_marker_subtracts() {
        let signals = Signals {
            status_matched_expected: Some(200),
            body_available: true,
            claimed_marker_matched: Some("Powered by Vercel"),
            is_live: true,
            provider_can_takeover: Some(true),
            ..Default::default()
        };
        let result = score(&signals);
        // +20 status -15 claimed = 5
        assert_eq!(result.confidence, 5);
    }

    #[test]
    fn scenario_6_cannot_take_over_caps_total() {
        let signals = Signals {
            status_matched_expected: Some(404),
            error_pattern_matched: Some("no-site-found"),
            body_available: true,
            claimed_marker_matched: None,
            is_live: true,
            provider_can_takeover: Some(false),
            ..Default::default()
        };
        let result = score(&signals);
        // raw = 20 + 30 + 10 = 60, capped to 30
        assert_eq!(result.confidence, 30);
        assert!(result.evidence.iter().any(|e| e.contains("cap")));
    }

    #[test]
    fn no_claimed_marker_rule_does_not_fire_without_an_identified_provider() {
        // A live, ordinary host with a body but no provider match at all
        // (e.g. an A record that happens to fall in a cloud CIDR block but
        // isn't behind any cataloged service) must not pick up the "no
        // claimed-site marker" +10 — there is no provider marker list that
        // was actually consulted.
        let signals = Signals {
            body_available: true,
            claimed_marker_matched: None,
            is_live: true,
            provider_can_takeover: None,
            ..Default::default()
        };
        let result = score(&signals);
        assert_eq!(result.confidence, 0);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn confidence_never_exceeds_100() {
        let dangling_ns = vec!["ns1.dead.invalid".to_string()];
        let signals = Signals {
            ns_takeover: true,
            dangling_ns: &dangling_ns,
            nxdomain_cname: true,
            dangling_chain_link_count: 3,
            status_matched_expected: Some(404),
            error_pattern_matched: Some("marker"),
            body_available: true,
            ssl_mismatch: true,
            dangling_a_record: true,
            is_live: false,
            provider_can_takeover: Some(true),
            ..Default::default()
        };
        let result = score(&signals);
        assert!(result.confidence <= 100);
    }

    #[test]
    fn confidence_never_negative() {
        let signals = Signals {
            status_matched_expected: None,
            body_available: true,
            claimed_marker_matched: Some("claimed"),
            wildcard_detected: true,
            is_live: true,
            ..Default::default()
        };
        let result = score(&signals);
        assert_eq!(result.confidence, 0);
    }

    #[test]
    fn chain_link_contribution_caps_at_seventy() {
        let signals = Signals {
            dangling_chain_link_count: 4, // 4 * 35 = 140, capped to 70
            is_live: true,
            ..Default::default()
        };
        let result = score(&signals);
        assert_eq!(result.confidence, 70);
    }

    #[test]
    fn wildcard_suppression_reduces_confidence_by_twenty() {
        let base = Signals {
            nxdomain_cname: true,
            is_live: false,
            provider_can_takeover: Some(true),
            ..Default::default()
        };
        let with_wildcard = Signals {
            wildcard_detected: true,
            ..base.clone()
        };
        assert_eq!(score(&base).confidence - score(&with_wildcard).confidence, 20);
    }
}
