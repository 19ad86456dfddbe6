//! Cooperative cancellation for the poll loop

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable stop signal shared between the poll loop and whoever ends it
///
/// Once triggered it stays triggered. The loop checks it before every cycle
/// and waits on it during the inter-cycle sleep; an in-flight cycle is never
/// interrupted.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests a stop; repeated calls are harmless
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once the signal has been triggered
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_untriggered() {
        assert!(!Shutdown::new().is_triggered());
    }

    #[test]
    fn test_trigger_is_visible_to_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();

        clone.trigger();
        clone.trigger();

        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_after_trigger() {
        let shutdown = Shutdown::new();
        let remote = shutdown.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.trigger();
        });

        tokio::time::timeout(Duration::from_secs(5), shutdown.triggered())
            .await
            .expect("shutdown was never observed");
    }

    #[tokio::test]
    async fn test_triggered_resolves_immediately_when_already_set() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(100), shutdown.triggered())
            .await
            .unwrap();
    }
}
