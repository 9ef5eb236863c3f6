//! Provider Catalog (component C1) — lookup operations over the static
//! catalog in [`catalog`]. Nothing here mutates at runtime; every function
//! is a read-only scan over `catalog::CATALOG` or `cloud_ranges::CLOUD_RANGES`.

pub mod catalog;
pub mod cloud_ranges;

pub use catalog::{Provider, CATALOG};
pub use cloud_ranges::classify_ip;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Info => "INFO",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Identify a provider from a CNAME head, falling back to the rest of the
/// chain if the head doesn't match anything (`spec.md` §4.1). First match
/// wins; patterns are case-insensitive substrings.
pub fn identify_by_cname(head: Option<&str>, chain: &[String]) -> Option<&'static Provider> {
    if let Some(head) = head {
        if let Some(p) = find_by_cname_target(head) {
            return Some(p);
        }
    }
    chain.iter().find_map(|link| find_by_cname_target(link))
}

fn find_by_cname_target(target: &str) -> Option<&'static Provider> {
    let target = target.to_ascii_lowercase();
    CATALOG.iter().find(|provider| {
        provider
            .cname_patterns
            .iter()
            .any(|pattern| target.contains(&pattern.to_ascii_lowercase()))
    })
}

/// Identify a provider purely from response headers, when CNAME-based
/// identification found nothing (`spec.md` §4.1, §4.4 Stage 6). A provider
/// matches when every entry in its header fingerprint is satisfied; an
/// empty required substring means "header present" is enough.
pub fn identify_by_headers(headers: &HashMap<String, String>) -> Option<&'static Provider> {
    CATALOG.iter().find(|provider| {
        !provider.header_fingerprint.is_empty()
            && provider.header_fingerprint.iter().all(|(name, substring)| {
                headers
                    .get(&name.to_ascii_lowercase())
                    .map(|value| {
                        substring.is_empty()
                            || value.to_ascii_lowercase().contains(&substring.to_ascii_lowercase())
                    })
                    .unwrap_or(false)
            })
    })
}
