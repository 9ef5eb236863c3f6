//! Apex wildcard-DNS detection (`spec.md` §4.2 `has_wildcard`, §4.4 Stage 8
//! wildcard suppression). Two independent random labels are queried under
//! the apex; if both resolve, the apex is treated as wildcarded and every
//! Finding in the scan gets its confidence suppressed by 20.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::dns::resolver::{ClassifyResult, DnsResolver};

const LABEL_LEN: usize = 20;

fn random_label() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LABEL_LEN)
        .map(char::from)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Runs the two-probe check described above. Callers should memoize the
/// result once per scan — see [`WildcardCheck`] for the memoizing wrapper
/// the scheduler actually holds.
pub async fn probe_wildcard(resolver: &(impl DnsResolver + ?Sized), apex: &str) -> bool {
    let first = format!("{}.{}", random_label(), apex);
    let second = format!("{}.{}", random_label(), apex);

    let first_resolves = matches!(resolver.classify_target(&first).await, ClassifyResult::Exists);
    let second_resolves = matches!(resolver.classify_target(&second).await, ClassifyResult::Exists);

    first_resolves && second_resolves
}

/// Memoizes `has_wildcard` for one apex across an entire scan so the check
/// truly runs "exactly once" regardless of how many hostnames are probed
/// concurrently (`spec.md` §4.4: "memoized per scan (run exactly once)").
pub struct WildcardCheck {
    cell: tokio::sync::OnceCell<bool>,
}

impl WildcardCheck {
    pub fn new() -> Self {
        Self {
            cell: tokio::sync::OnceCell::new(),
        }
    }

    pub async fn get(&self, resolver: &dyn DnsResolver, apex: &str) -> bool {
        *self
            .cell
            .get_or_init(|| async { probe_wildcard(resolver, apex).await })
            .await
    }
}

impl Default for WildcardCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_labels_are_distinct_and_right_length() {
        let a = random_label();
        let b = random_label();
        assert_eq!(a.len(), LABEL_LEN);
        assert_eq!(b.len(), LABEL_LEN);
        assert_ne!(a, b);
    }
}
