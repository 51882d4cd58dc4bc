//! Graceful-drain coordination for the process that hosts this engine.
//!
//! The matching engine itself has no cancellation or timeout affordance:
//! once a book's lock is held, an operation runs to completion. What a
//! real process *can* do is stop handing new work to the boundary once
//! SIGINT/SIGTERM arrives, let in-flight operations finish, then exit. This
//! module is that coordination primitive; it knows nothing about the engine
//! or transport it is embedded in.
//!
//! Built on `tokio_util::sync::CancellationToken` rather than a bare
//! `Notify` paired with an `AtomicBool`: a token's `cancelled()` future
//! checks the cancellation flag and registers the waiter atomically under
//! one lock, so a `shutdown()` arriving on another thread strictly between
//! the flag check and the registration can never be missed.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Signals every clone when shutdown has been requested, either by a manual
/// call or by the process receiving Ctrl+C (SIGINT).
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        ShutdownController {
            token: CancellationToken::new(),
        }
    }

    /// Spawns a background task that triggers shutdown when Ctrl+C arrives.
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("received interrupt signal, starting graceful drain");
                    token.cancel();
                }
                Err(error) => warn!(%error, "failed to install ctrl-c handler"),
            }
        });
        controller
    }

    /// Trigger shutdown from anywhere (e.g. an admin endpoint).
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown has been requested.
    pub async fn drained(&self) {
        self.token.cancelled().await;
    }
}
