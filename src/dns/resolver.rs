//! DNS Resolver Layer (component C2) — the protocol-level implementation of
//! [`DnsResolver`], backed by `hickory-resolver`. An external-tool fallback
//! lives alongside in [`crate::dns::dig`] for the cases the spec calls out
//! (chain collapsing); both satisfy the same trait so the detector never
//! cares which one it's talking to.

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::RData;
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use crate::dns::cache::{DnsCache, QueryType};

/// Outcome of resolving a single name, independent of record type —
/// `spec.md` §4.2's `classify_target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyResult {
    Exists,
    NxDomain,
    NoNameservers,
    OtherError,
}

/// The CNAME chain from `name` to its terminus. `head` is the first hop (or
/// `None` if `name` has no CNAME at all); `chain` holds every hop including
/// the head, in query order, deduplicated against cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CnameChain {
    pub head: Option<String>,
    pub chain: Vec<String>,
}

const MAX_CNAME_HOPS: usize = 5;

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve_cname(&self, name: &str) -> CnameChain;
    async fn resolve_a(&self, name: &str) -> Vec<String>;
    async fn resolve_ns(&self, name: &str) -> Vec<String>;
    async fn classify_target(&self, name: &str) -> ClassifyResult;

    /// Two independent random 20-character labels under `apex`; wildcard
    /// iff both resolve. Caller is responsible for memoizing this per scan
    /// (`spec.md` §4.4 Stage 8) — see [`crate::dns::wildcard::WildcardCheck`].
    async fn has_wildcard(&self, apex: &str) -> bool {
        crate::dns::wildcard::probe_wildcard(self, apex).await
    }
}

pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
    cname_cache: DnsCache<CnameChain>,
    a_cache: DnsCache<Vec<String>>,
    ns_cache: DnsCache<Vec<String>>,
    classify_cache: DnsCache<ClassifyResult>,
}

impl HickoryResolver {
    pub fn new(timeout: Duration) -> Result<Self, crate::error::DetectorError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 2;
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        Ok(Self {
            resolver,
            cname_cache: DnsCache::new(),
            a_cache: DnsCache::new(),
            ns_cache: DnsCache::new(),
            classify_cache: DnsCache::new(),
        })
    }

    async fn lookup_cname_once(&self, name: &str) -> Option<String> {
        match self.resolver.lookup(name, hickory_resolver::proto::rr::RecordType::CNAME).await {
            Ok(lookup) => lookup.iter().find_map(|rdata| match rdata {
                RData::CNAME(target) => Some(target.to_string().trim_end_matches('.').to_string()),
                _ => None,
            }),
            Err(e) => {
                debug!(%name, error = %e, "cname lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn resolve_cname(&self, name: &str) -> CnameChain {
        if let Some(cached) = self.cname_cache.get(QueryType::Cname, name) {
            return cached;
        }

        let mut chain = Vec::new();
        let mut current = name.to_string();
        let head;
        match self.lookup_cname_once(&current).await {
            Some(first) => {
                head = Some(first.clone());
                chain.push(first.clone());
                current = first;
            }
            None => {
                let result = CnameChain::default();
                self.cname_cache.insert(QueryType::Cname, name, result.clone());
                return result;
            }
        }

        for _ in 1..MAX_CNAME_HOPS {
            match self.lookup_cname_once(&current).await {
                Some(next) => {
                    if chain.iter().any(|seen| seen.eq_ignore_ascii_case(&next)) {
                        break; // cycle
                    }
                    chain.push(next.clone());
                    current = next;
                }
                None => break, // NoAnswer or non-CNAME terminus
            }
        }

        let result = CnameChain { head, chain };
        self.cname_cache.insert(QueryType::Cname, name, result.clone());
        result
    }

    async fn resolve_a(&self, name: &str) -> Vec<String> {
        if let Some(cached) = self.a_cache.get(QueryType::A, name) {
            return cached;
        }
        let result = match self.resolver.lookup_ip(name).await {
            Ok(lookup) => lookup.iter().map(|ip| ip.to_string()).collect(),
            Err(e) => {
                debug!(%name, error = %e, "a lookup failed");
                Vec::new()
            }
        };
        self.a_cache.insert(QueryType::A, name, result.clone());
        result
    }

    async fn resolve_ns(&self, name: &str) -> Vec<String> {
        if let Some(cached) = self.ns_cache.get(QueryType::Ns, name) {
            return cached;
        }
        let result = match self.resolver.lookup(name, hickory_resolver::proto::rr::RecordType::NS).await {
            Ok(lookup) => lookup
                .iter()
                .filter_map(|rdata| match rdata {
                    RData::NS(target) => Some(target.to_string().trim_end_matches('.').to_string()),
                    _ => None,
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        self.ns_cache.insert(QueryType::Ns, name, result.clone());
        result
    }

    async fn classify_target(&self, name: &str) -> ClassifyResult {
        if let Some(cached) = self.classify_cache.get(QueryType::Classify, name) {
            return cached;
        }
        let result = match self.resolver.lookup_ip(name).await {
            Ok(_) => ClassifyResult::Exists,
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => ClassifyResult::Exists,
                ResolveErrorKind::Message(_) | ResolveErrorKind::Msg(_) => ClassifyResult::OtherError,
                _ => classify_from_error_string(&e.to_string()),
            },
        };
        self.classify_cache.insert(QueryType::Classify, name, result);
        result
    }
}

/// `hickory-resolver`'s error enum doesn't expose NXDOMAIN vs.
/// no-nameservers as distinct variants across all paths; both show up in
/// the formatted proto error. Falling back to the message text keeps the
/// distinction the spec requires without depending on resolver internals
/// that vary between releases.
fn classify_from_error_string(message: &str) -> ClassifyResult {
    let lower = message.to_ascii_lowercase();
    if lower.contains("nxdomain") || lower.contains("no such name") {
        ClassifyResult::NxDomain
    } else if lower.contains("no nameservers") || lower.contains("no connections available") {
        ClassifyResult::NoNameservers
    } else {
        ClassifyResult::OtherError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nxdomain_text_classifies_as_nxdomain() {
        assert_eq!(
            classify_from_error_string("proto error: NXDOMAIN"),
            ClassifyResult::NxDomain
        );
    }

    #[test]
    fn no_nameservers_text_classifies_distinctly() {
        assert_eq!(
            classify_from_error_string("No nameservers left to try"),
            ClassifyResult::NoNameservers
        );
    }

    #[test]
    fn unknown_text_is_other_error() {
        assert_eq!(classify_from_error_string("timed out"), ClassifyResult::OtherError);
    }
}
