//! # Debouncer
//!
//! Coalesces rapid input (product search as the cashier types) into a single
//! value emitted after a quiet period.
//!
//! ```text
//!  push("c")  push("co")  push("cof")          ── delay ──►  emit("cof")
//!     │           │            │                              │
//!  ───┴───────────┴────────────┴──────────────────────────────┴──► time
//!     each push restarts the timer and replaces the pending value
//! ```
//!
//! The worker is a tokio task, so [`Debouncer::new`] must be called inside a
//! runtime. Dropping the debouncer cancels it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    shutdown: CancellationToken,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Starts the worker. Settled values arrive on the returned receiver;
    /// the receiver yields `None` once the debouncer is cancelled.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<T>();
        let (output_tx, output_rx) = mpsc::unbounded_channel::<T>();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let mut deadline: Option<Instant> = None;

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    value = input_rx.recv() => match value {
                        Some(value) => {
                            pending = Some(value);
                            deadline = Some(Instant::now() + delay);
                        }
                        None => break,
                    },

                    _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        deadline = None;
                        if let Some(value) = pending.take() {
                            if output_tx.send(value).is_err() {
                                break;
                            }
                        }
                    }
                }
            }

            trace!("Debouncer stopped");
        });

        (
            Debouncer {
                input: input_tx,
                shutdown,
            },
            output_rx,
        )
    }

    /// Replaces the pending value and restarts the quiet period.
    /// Ignored after cancellation.
    pub fn push(&self, value: T) {
        let _ = self.input.send(value);
    }
}

impl<T> Debouncer<T> {
    /// Drops any pending value and stops the worker.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
