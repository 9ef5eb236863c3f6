//! Process-wide rate limiting primitive (`spec.md` §4.5, §5: "Rate limiter:
//! process-wide (one per service class); serializes via an internal
//! counting primitive"). A plain token bucket over a `tokio::sync::Semaphore`
//! — the same `Semaphore`-gated concurrency pattern the retrieved corpus
//! uses for bounding concurrent probes, adapted here to bound a rate
//! instead of a concurrency level: acquired permits are forgotten rather
//! than released, and a background task tops the bucket back up once a
//! second.
//!
//! One instance is constructed per external-service class (DNS backends,
//! HTTP/TLS probes — `spec.md` §4.5) and shared behind an `Arc` across
//! every concurrent detector pipeline in a scan.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    refill: JoinHandle<()>,
}

impl RateLimiter {
    /// Allows up to `per_second` acquisitions per rolling second at steady
    /// state. `per_second` is clamped to at least 1.
    pub fn new(per_second: u32) -> Self {
        let capacity = per_second.max(1) as usize;
        let semaphore = Arc::new(Semaphore::new(capacity));
        let refill_handle = Arc::clone(&semaphore);
        let refill = tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tick.tick().await;
                let deficit = capacity.saturating_sub(refill_handle.available_permits());
                if deficit > 0 {
                    refill_handle.add_permits(deficit);
                }
            }
        });
        Self {
            semaphore,
            capacity,
            refill,
        }
    }

    /// Blocks until a slot is available. The permit is forgotten rather
    /// than dropped back into the pool immediately — capacity is restored
    /// only by the once-a-second refill, which is what makes this a rate
    /// limiter rather than a bare concurrency gate.
    pub async fn acquire(&self) {
        let permit = self
            .semaphore
            .acquire()
            .await
            .expect("rate limiter semaphore is never closed");
        permit.forget();
    }

    pub fn configured_rate(&self) -> usize {
        self.capacity
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.refill.abort();
    }
}
