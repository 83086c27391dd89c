// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal handling for interrupting a run.
//!
//! SIGINT (Ctrl+C) and SIGTERM trigger a [`CancellationToken`]. A running
//! deletion reacts by cancelling the session: dispatched deletes finish,
//! nothing new starts, and the run still reaches `complete` so the log can
//! be exported.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::Session;

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a token cancelled when either signal arrives. The handler task
/// exits once the token is cancelled by anyone.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_signal() => {
                token_clone.cancel();
                debug!("shutdown signal handler completed");
            }
            () = token_clone.cancelled() => {}
        }
    });

    token
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), cancelling"),
                    _ = sigterm.recv() => info!("received SIGTERM, cancelling"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, only Ctrl+C will cancel");
                let _ = ctrl_c.await;
                info!("received SIGINT (Ctrl+C), cancelling");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, cancelling");
    }
}

/// Cancels `session` when `token` fires.
///
/// The returned task ends after forwarding once; abort it when the run
/// finishes without a signal.
pub fn cancel_session_on(
    token: CancellationToken,
    session: Arc<Session>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        token.cancelled().await;
        session.cancel();
    })
}
