//! Per-question countdown
//!
//! The countdown runs as a background task that sends one tick per second
//! and a final `Expired` through a channel. Cancelling the token stops it
//! before the next send, so no tick or expiry is emitted after an answer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Events sent by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One second elapsed
    Tick {
        /// Seconds left after this tick
        remaining: u32,
    },
    /// The countdown reached zero
    Expired,
}

/// How a countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Expired,
    Cancelled,
}

/// Count down `seconds`, reporting through `tx` until expiry or cancellation
pub async fn run_countdown(
    seconds: u32,
    tx: mpsc::Sender<CountdownEvent>,
    cancel_token: CancellationToken,
) -> CountdownOutcome {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick of a tokio interval completes immediately
    interval.tick().await;

    let mut remaining = seconds;
    while remaining > 0 {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => return CountdownOutcome::Cancelled,
            _ = interval.tick() => {}
        }

        remaining -= 1;
        if cancel_token.is_cancelled() || tx.send(CountdownEvent::Tick { remaining }).await.is_err() {
            return CountdownOutcome::Cancelled;
        }
    }

    if cancel_token.is_cancelled() || tx.send(CountdownEvent::Expired).await.is_err() {
        return CountdownOutcome::Cancelled;
    }
    CountdownOutcome::Expired
}

/// Handle to a countdown running on the tokio runtime.
///
/// Dropping the handle cancels the countdown.
pub struct Countdown {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<CountdownOutcome>>,
}

impl Countdown {
    /// Spawn a countdown task
    pub fn spawn(seconds: u32, tx: mpsc::Sender<CountdownEvent>) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_countdown(seconds, tx, cancel_token.clone()));
        Self { cancel_token, handle: Some(handle) }
    }

    /// Stop the countdown. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the countdown was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Wait for the countdown task to end
    pub async fn finished(mut self) -> Option<CountdownOutcome> {
        let handle = self.handle.take()?;
        handle.await.ok()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
