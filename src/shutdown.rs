//! # Shutdown Signal
//!
//! Handle condiviso per l'interruzione da parte dell'utente (Ctrl+C).
//!
//! - Il primo Ctrl+C attiva l'handle: il dispatcher smette di avviare nuovi
//!   job, i job già in corso terminano normalmente (limitati dal timeout del
//!   tool), le passate sequenziali si fermano al file successivo.
//! - Il secondo Ctrl+C termina subito il processo.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Exit status used when the user aborts twice
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cloneable interrupt flag with async notification
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once `trigger` has been called
    pub async fn triggered(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as `self`, so the channel never closes here.
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }

    /// Spawn a task translating Ctrl+C into `trigger`. Must run inside a tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            warn!("⚠️ Interrupt received: finishing running jobs, press Ctrl+C again to abort");
            shutdown.trigger();

            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n⚠️ Aborted by user");
                std::process::exit(FORCED_EXIT_CODE);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_visible_to_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        assert!(!clone.is_triggered());
        shutdown.trigger();
        assert!(clone.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiters() {
        let shutdown = Shutdown::new();
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.triggered().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_triggered_returns_immediately_when_already_set() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(200), shutdown.triggered())
            .await
            .expect("already triggered");
    }
}
