//! External-resolver fallback (`spec.md` §4.2: "An implementation may
//! delegate to an external resolver tool... because the protocol-level
//! resolver sometimes collapses chains"). Shells out to the system `dig`
//! binary, one query per hop, same contract as [`crate::dns::resolver::DnsResolver`].
//!
//! Grounded on the teacher's own `DnsAnalyzer` pattern of resolving CNAMEs
//! by invoking an external command rather than a library resolver.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::dns::resolver::{ClassifyResult, CnameChain, DnsResolver};

const MAX_CNAME_HOPS: usize = 5;

/// Resolves via the `dig` CLI instead of an in-process resolver. Useful
/// when the caller's environment has a locally configured `dig` that
/// follows a split-horizon or otherwise non-standard path the bundled
/// resolver library doesn't see.
pub struct DigResolver {
    binary: String,
}

impl DigResolver {
    pub fn new() -> Self {
        Self {
            binary: "dig".to_string(),
        }
    }

    async fn query(&self, name: &str, record_type: &str) -> Option<String> {
        let output = Command::new(&self.binary)
            .args(["+short", "+time=3", "+tries=1", record_type, name])
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        String::from_utf8(output.stdout)
            .ok()?
            .lines()
            .next()
            .map(|line| line.trim_end_matches('.').trim().to_string())
            .filter(|line| !line.is_empty())
    }

    async fn query_all(&self, name: &str, record_type: &str) -> Vec<String> {
        let output = match Command::new(&self.binary)
            .args(["+short", "+time=3", "+tries=1", record_type, name])
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(o) if o.status.success() => o,
            _ => return Vec::new(),
        };

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim_end_matches('.').trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl Default for DigResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsResolver for DigResolver {
    async fn resolve_cname(&self, name: &str) -> CnameChain {
        let mut chain = Vec::new();
        let mut current = name.to_string();

        let head = match self.query(&current, "CNAME").await {
            Some(first) => {
                chain.push(first.clone());
                current = first.clone();
                Some(first)
            }
            None => return CnameChain::default(),
        };

        for _ in 1..MAX_CNAME_HOPS {
            match self.query(&current, "CNAME").await {
                Some(next) if !chain.iter().any(|seen: &String| seen.eq_ignore_ascii_case(&next)) => {
                    chain.push(next.clone());
                    current = next;
                }
                _ => break,
            }
        }

        CnameChain { head, chain }
    }

    async fn resolve_a(&self, name: &str) -> Vec<String> {
        self.query_all(name, "A").await
    }

    async fn resolve_ns(&self, name: &str) -> Vec<String> {
        self.query_all(name, "NS").await
    }

    async fn classify_target(&self, name: &str) -> ClassifyResult {
        let output = match Command::new(&self.binary)
            .args(["+time=3", "+tries=1", name])
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(o) => o,
            Err(e) => {
                debug!(%name, error = %e, "dig invocation failed");
                return ClassifyResult::OtherError;
            }
        };

        let text = String::from_utf8_lossy(&output.stdout).to_ascii_uppercase();
        if text.contains("STATUS: NXDOMAIN") {
            ClassifyResult::NxDomain
        } else if text.contains("CONNECTION TIMED OUT") || text.contains("NO SERVERS COULD BE REACHED") {
            ClassifyResult::NoNameservers
        } else if text.contains("STATUS: NOERROR") {
            ClassifyResult::Exists
        } else {
            ClassifyResult::OtherError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_default_binary_name() {
        let resolver = DigResolver::new();
        assert_eq!(resolver.binary, "dig");
    }
}
