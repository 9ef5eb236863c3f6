//! Composite resolution strategy (component C2, DESIGN NOTES §9: "prefer
//! tool, fall back to in-process library"). Every operation tries the
//! external `dig` strategy first, since a locally configured resolver
//! sometimes sees a CNAME chain the bundled library resolver collapses or
//! can't reach (split-horizon DNS, custom `/etc/resolv.conf`); whenever
//! `dig` returns a neutral/empty result — which is indistinguishable from
//! "not installed" and "genuinely empty" — it falls back to the
//! `hickory-resolver`-backed strategy, which is always present and is the
//! source of truth for conformance testing.

use async_trait::async_trait;

use super::dig::DigResolver;
use super::resolver::{ClassifyResult, CnameChain, DnsResolver, HickoryResolver};

pub struct CompositeResolver {
    tool: DigResolver,
    fallback: HickoryResolver,
}

impl CompositeResolver {
    pub fn new(fallback: HickoryResolver) -> Self {
        Self {
            tool: DigResolver::new(),
            fallback,
        }
    }
}

#[async_trait]
impl DnsResolver for CompositeResolver {
    async fn resolve_cname(&self, name: &str) -> CnameChain {
        let chain = self.tool.resolve_cname(name).await;
        if chain.head.is_some() {
            return chain;
        }
        self.fallback.resolve_cname(name).await
    }

    async fn resolve_a(&self, name: &str) -> Vec<String> {
        let result = self.tool.resolve_a(name).await;
        if !result.is_empty() {
            return result;
        }
        self.fallback.resolve_a(name).await
    }

    async fn resolve_ns(&self, name: &str) -> Vec<String> {
        let result = self.tool.resolve_ns(name).await;
        if !result.is_empty() {
            return result;
        }
        self.fallback.resolve_ns(name).await
    }

    async fn classify_target(&self, name: &str) -> ClassifyResult {
        match self.tool.classify_target(name).await {
            ClassifyResult::OtherError => self.fallback.classify_target(name).await,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn falls_back_when_dig_binary_is_absent() {
        // `DigResolver` defaults to invoking the literal binary name "dig";
        // in a minimal test environment without it on PATH every tool call
        // returns a neutral result, so composite behavior must match the
        // fallback resolver's behavior exactly.
        let fallback = HickoryResolver::new(Duration::from_millis(50)).unwrap();
        let composite = CompositeResolver::new(fallback);
        // No network in unit tests; this just exercises the fallback path
        // without panicking.
        let _ = composite.resolve_a("example.invalid").await;
    }
}
