//! DNS Resolver Layer (component C2): CNAME-chain walking, A/NS
//! resolution, wildcard detection and NXDOMAIN classification, with
//! process-scoped caching and an external-tool fallback strategy.

pub mod cache;
pub mod composite;
pub mod dig;
pub mod rate_limited;
pub mod resolver;
pub mod wildcard;

pub use composite::CompositeResolver;
pub use rate_limited::RateLimitedResolver;
pub use resolver::{ClassifyResult, CnameChain, DnsResolver, HickoryResolver};
pub use wildcard::WildcardCheck;
