//! Bounded DOM change watcher.
//!
//! Observes body mutations for a fixed window and reports "significant"
//! batches (any node added or removed) to a callback. The watcher stops on
//! its own once the window closes so pages that mutate forever (ad
//! rotation, live counters) do not hold an observer indefinitely.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dom::{MutationBatch, MutationSource, ObserveOptions};

/// Default observation window.
pub const DEFAULT_WATCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// How long to observe before disconnecting
    pub timeout: Duration,

    pub options: ObserveOptions,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WATCH_TIMEOUT,
            options: ObserveOptions::default(),
        }
    }
}

impl WatchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Whether a batch adds or removes at least one node.
pub fn is_significant(batch: &MutationBatch) -> bool {
    batch.iter().any(|record| record.changes_nodes())
}

/// Handle to a running observation.
///
/// Disconnecting is idempotent; whichever of the timeout or an explicit
/// [`WatcherHandle::disconnect`] comes first wins, the other is a no-op.
#[derive(Debug, Clone)]
pub struct WatcherHandle {
    token: CancellationToken,
    disconnected: Arc<AtomicBool>,
}

impl WatcherHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            disconnected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that was never connected (nothing to observe).
    fn detached() -> Self {
        let handle = Self::new();
        handle.disconnected.store(true, Ordering::SeqCst);
        handle
    }

    /// Stop observing. Safe to call any number of times.
    pub fn disconnect(&self) {
        if self.mark_disconnected() {
            self.token.cancel();
            debug!("DOM observer disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }

    /// Returns true only for the first caller.
    fn mark_disconnected(&self) -> bool {
        !self.disconnected.swap(true, Ordering::SeqCst)
    }
}

/// Starts bounded observations.
pub struct ChangeWatcher;

impl ChangeWatcher {
    /// Observe `source` and call `on_change` once per significant batch.
    ///
    /// Must be called within a tokio runtime.
    pub fn observe<F>(source: &dyn MutationSource, config: &WatchConfig, on_change: F) -> WatcherHandle
    where
        F: Fn() + Send + 'static,
    {
        let Some(mut rx) = source.subscribe(&config.options) else {
            debug!("Nothing to observe, watcher not started");
            return WatcherHandle::detached();
        };

        let handle = WatcherHandle::new();
        let task_handle = handle.clone();
        let deadline = Instant::now() + config.timeout;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Deadline and cancellation are checked before queued batches
                    biased;

                    _ = task_handle.token.cancelled() => break,

                    _ = tokio::time::sleep_until(deadline) => {
                        if task_handle.mark_disconnected() {
                            info!("DOM observer disconnected after timeout");
                        }
                        break;
                    }

                    batch = rx.recv() => match batch {
                        Some(batch) => {
                            if is_significant(&batch) {
                                on_change();
                            }
                        }
                        None => {
                            task_handle.mark_disconnected();
                            break;
                        }
                    },
                }
            }
        });

        handle
    }
}
