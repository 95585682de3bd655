// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! SIGTERM and SIGINT (Ctrl+C) cancel a [`CancellationToken`] that the
//! dialogue loop monitors. In-flight user events and finalizations are then
//! drained with a deadline before the record store is closed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a token that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for spawned user workers and finalizations to finish.
///
/// Closes the tracker. Workers still running may spawn finalizations, which
/// are waited for too. Returns `true` when everything completed in time.
pub async fn drain_finalizations(tracker: &TaskTracker, timeout: Duration) -> bool {
    tracker.close();

    let in_flight = tracker.len();
    if in_flight == 0 {
        info!("no in-flight tasks to drain");
        return true;
    }

    info!(count = in_flight, "waiting for in-flight tasks");
    match tokio::time::timeout(timeout, tracker.wait()).await {
        Ok(()) => {
            info!("all in-flight tasks drained");
            true
        }
        Err(_) => {
            warn!(
                remaining = tracker.len(),
                "timeout reached, abandoning in-flight tasks"
            );
            false
        }
    }
}
