//! Demonstrative process bootstrap: reads a bind address, initializes
//! structured logging from `RUST_LOG`, and waits for SIGINT/SIGTERM before
//! finishing in-flight work and exiting. The actual network listener is a
//! real transport's job and is out of scope here — this binary only shows
//! the shape a transport would be wired into.

use lob_engine::prelude::*;
use lob_engine::shutdown::ShutdownController;
use std::sync::Arc;
use tracing::info;

fn bind_address() -> String {
    std::env::var("LOB_ENGINE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(error) => {
            tracing::warn!(%error, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let registry = Arc::new(Registry::new());
    let boundary = Boundary::new(registry.clone());
    let shutdown = ShutdownController::with_ctrl_c();

    let addr = bind_address();
    info!(%addr, "engine process starting (no listener wired up in this demo)");

    // A real transport would accept connections here and hand each request
    // to `boundary`, exiting its accept loop once `shutdown.drained()`
    // resolves. This bootstrap just demonstrates the signal wiring.
    let sigterm = shutdown.clone();
    tokio::spawn(async move {
        wait_for_sigterm().await;
        info!("received SIGTERM, initiating graceful drain");
        sigterm.shutdown();
    });

    boundary.create_book("BTC-USDT");
    info!(pairs = ?registry.pairs(), "registry ready");

    shutdown.drained().await;
    info!("drain complete, exiting");
}
