// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pause and cancel signals shared between a run and its front end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nuketune_core::NukeError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cooperative pause/cancel handle for one run.
///
/// Cancellation is one-way: once cancelled, a control stays cancelled, and a
/// new run needs a new control. Nothing here aborts work already in flight;
/// a delete that has been sent is allowed to finish and is logged normally.
/// The checkpoints that honour the flags are the start of a category, the
/// start of a chunk, every pause poll, and the moment before a delete is
/// issued.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Also clears the pause flag so paused items wake
    /// up and observe it.
    pub fn cancel(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn pause(&self) {
        if !self.is_cancelled() {
            self.paused.store(true, Ordering::SeqCst);
        }
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Token that fires when the run is cancelled.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Blocks while paused, polling every `poll`.
    ///
    /// Returns [`NukeError::Cancelled`] if the run is cancelled before or
    /// while waiting, and once more after the pause lifts.
    pub async fn wait_while_paused(&self, poll: Duration) -> Result<(), NukeError> {
        while self.is_paused() {
            debug!("item waiting for resume");
            tokio::select! {
                _ = tokio::time::sleep(poll) => {}
                _ = self.cancel.cancelled() => {}
            }
            if self.is_cancelled() {
                return Err(NukeError::Cancelled);
            }
        }
        if self.is_cancelled() {
            return Err(NukeError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn cancel_is_sticky_and_clears_pause() {
        let control = RunControl::new();
        control.pause();
        assert!(control.is_paused());
        control.cancel();
        assert!(control.is_cancelled());
        assert!(!control.is_paused());
        control.pause();
        assert!(!control.is_paused(), "a cancelled run cannot be paused");
        control.resume();
        assert!(control.is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let control = RunControl::new();
        let other = control.clone();
        other.pause();
        assert!(control.is_paused());
        other.cancel();
        assert!(control.token().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_resumed() {
        let control = RunControl::new();
        control.pause();
        let resumer = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            resumer.resume();
        });

        let start = Instant::now();
        control
            .wait_while_paused(Duration::from_millis(500))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_paused_aborts_wait() {
        let control = RunControl::new();
        control.pause();
        let canceller = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(700)).await;
            canceller.cancel();
        });

        let err = control
            .wait_while_paused(Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn unpaused_cancelled_control_reports_cancel() {
        let control = RunControl::new();
        control.cancel();
        assert!(control.wait_while_paused(Duration::from_millis(1)).await.is_err());
    }
}
