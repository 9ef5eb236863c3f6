//! Rate-limited resolver decorator (`spec.md` §4.5: "a per-external-service
//! limiter bounds calls/second... for DNS backends"). Wraps any
//! [`DnsResolver`] and gates every query through a shared
//! [`crate::scheduler::rate_limiter::RateLimiter`] before delegating, so the limiter's
//! construction (one per scan, owned by the Concurrency Controller) stays
//! decoupled from the resolution strategy underneath it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::scheduler::rate_limiter::RateLimiter;

use super::resolver::{ClassifyResult, CnameChain, DnsResolver};

pub struct RateLimitedResolver {
    inner: Arc<dyn DnsResolver>,
    limiter: Arc<RateLimiter>,
}

impl RateLimitedResolver {
    pub fn new(inner: Arc<dyn DnsResolver>, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl DnsResolver for RateLimitedResolver {
    async fn resolve_cname(&self, name: &str) -> CnameChain {
        self.limiter.acquire().await;
        self.inner.resolve_cname(name).await
    }

    async fn resolve_a(&self, name: &str) -> Vec<String> {
        self.limiter.acquire().await;
        self.inner.resolve_a(name).await
    }

    async fn resolve_ns(&self, name: &str) -> Vec<String> {
        self.limiter.acquire().await;
        self.inner.resolve_ns(name).await
    }

    async fn classify_target(&self, name: &str) -> ClassifyResult {
        self.limiter.acquire().await;
        self.inner.classify_target(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver(Arc<AtomicUsize>);

    #[async_trait]
    impl DnsResolver for CountingResolver {
        async fn resolve_cname(&self, _name: &str) -> CnameChain {
            self.0.fetch_add(1, Ordering::SeqCst);
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

    #[tokio::test]
    async fn delegates_after_acquiring_a_permit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner: Arc<dyn DnsResolver> = Arc::new(CountingResolver(Arc::clone(&calls)));
        let limiter = Arc::new(RateLimiter::new(10));
        let wrapped = RateLimitedResolver::new(inner, limiter);
        wrapped.resolve_cname("x.example.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
