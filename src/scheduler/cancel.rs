//! Cooperative cancellation (`spec.md` §5: "the controller must propagate
//! cancellation... to in-flight detectors"). A thin wrapper around
//! `tokio::sync::watch` so callers (e.g. a signal handler in an external
//! CLI) can flip one flag and have every in-flight [`crate::detector::Detector`]
//! pipeline notice it on its next scheduling point.

use tokio::sync::watch;

/// The write half, held by whoever decides to cancel a scan (a signal
/// handler, a test, an interactive "stop" command).
#[derive(Clone)]
pub struct CancelToken(watch::Sender<bool>);

impl CancelToken {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Builds a fresh, not-yet-cancelled token/receiver pair. The receiver is
/// cloned once per in-flight pipeline by [`super::Scheduler::run`].
pub fn cancel_token() -> (CancelToken, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (CancelToken(tx), rx)
}

/// Resolves as soon as `rx` reports cancellation — immediately if it
/// already has, otherwise on the next change. Raced against a Detector's
/// future in `Scheduler::run`'s `tokio::select!`.
pub async fn wait_for_cancel(mut rx: watch::Receiver<bool>) {
    if *rx.borrow() {
        return;
    }
    loop {
        if rx.changed().await.is_err() {
            // Sender dropped without ever cancelling: never resolves.
            std::future::pending::<()>().await;
        }
        if *rx.borrow() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_cancel_resolves_immediately_if_already_set() {
        let (tx, rx) = cancel_token();
        tx.cancel();
        wait_for_cancel(rx).await;
    }

    #[tokio::test]
    async fn wait_for_cancel_resolves_after_later_cancel() {
        let (tx, rx) = cancel_token();
        let waiter = tokio::spawn(wait_for_cancel(rx));
        tx.cancel();
        waiter.await.unwrap();
    }
}
