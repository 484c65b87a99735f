use std::future::Future;
use std::io;

use tokio::sync::watch;
use tracing::{info, warn};

/// Cooperative cancellation signal observed by the publication loop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>
}

/// The sending half of a [`Shutdown`] signal.
#[derive(Debug)]
pub struct ShutdownTrigger {
    sender: watch::Sender<bool>
}

impl Shutdown {
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (sender, receiver) = watch::channel(false);

        (ShutdownTrigger { sender }, Shutdown { receiver })
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown has been requested. Never resolves if the trigger is dropped
    /// without firing.
    pub async fn triggered(&mut self) {
        let observed = self.receiver.wait_for(|triggered| *triggered).await.map(|_| ());

        if observed.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Why [`ShutdownTrigger::forward`] stopped listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// A second request arrived after shutdown was already triggered.
    Forced,
    /// The request source failed and no further requests can be observed.
    Unavailable
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Triggers shutdown on the first request from `next_request`, then keeps listening so
    /// that a second request can be escalated by the caller.
    pub async fn forward<F, Fut>(self, mut next_request: F) -> Escalation
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        if let Err(error) = next_request().await {
            warn!("Unable to listen for shutdown signals: {error}");
            return Escalation::Unavailable;
        }

        info!("Received shutdown signal, finishing in-flight messages");
        self.trigger();

        match next_request().await {
            Ok(()) => Escalation::Forced,
            Err(error) => {
                warn!("Unable to listen for shutdown signals: {error}");
                Escalation::Unavailable
            }
        }
    }
}
