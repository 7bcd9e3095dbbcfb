use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::warn;

use crate::config::BridgeConfig;
use crate::error::{InboxError, NuiResult};

use super::HostBridge;

/// Outcome of one [`HostInbox::pump`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Messages decoded and dispatched.
    pub delivered: usize,
    /// Messages discarded as malformed.
    pub rejected: usize,
    /// Listener invocations across all delivered messages.
    pub invocations: usize,
}

/// Host-side handle for posting raw messages into an inbox.
///
/// Cheap to clone and usable from any thread.
#[derive(Debug, Clone)]
pub struct HostSender {
    tx: Sender<String>,
    capacity: usize,
    dropped: Arc<AtomicU64>,
}

impl HostSender {
    /// Queues `raw` without blocking.
    ///
    /// A full or closed inbox drops the message and counts it.
    pub fn post(&self, raw: impl Into<String>) -> NuiResult<()> {
        match self.tx.try_send(raw.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(capacity = self.capacity, "host inbox full; message dropped");
                Err(InboxError::Full {
                    capacity: self.capacity,
                }
                .into())
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("host inbox closed; message dropped");
                Err(InboxError::Closed.into())
            }
        }
    }
}

/// Bounded FIFO of raw host messages awaiting dispatch on the control thread.
#[derive(Debug)]
pub struct HostInbox {
    tx: Sender<String>,
    rx: Receiver<String>,
    capacity: usize,
    max_pump_batch: usize,
    dropped: Arc<AtomicU64>,
}

impl HostInbox {
    /// Creates an inbox sized by `cfg`; capacities clamp to at least 1.
    #[must_use]
    pub fn new(cfg: &BridgeConfig) -> Self {
        let capacity = cfg.inbox_capacity.max(1);
        let (tx, rx) = bounded::<String>(capacity);
        Self {
            tx,
            rx,
            capacity,
            max_pump_batch: cfg.max_pump_batch.max(1),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A posting handle for host threads.
    #[must_use]
    pub fn sender(&self) -> HostSender {
        HostSender {
            tx: self.tx.clone(),
            capacity: self.capacity,
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Messages currently queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Messages dropped because the inbox was full or closed.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Dispatches queued messages through `bridge` in arrival order.
    ///
    /// Handles at most `max_pump_batch` messages per call and never blocks.
    /// Malformed messages are logged and skipped.
    pub fn pump(&self, bridge: &HostBridge) -> PumpReport {
        let mut report = PumpReport::default();

        for _ in 0..self.max_pump_batch {
            let raw = match self.rx.try_recv() {
                Ok(raw) => raw,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };

            match bridge.deliver_raw(&raw) {
                Ok(invoked) => {
                    report.delivered += 1;
                    report.invocations += invoked;
                }
                Err(err) => {
                    report.rejected += 1;
                    warn!(error = %err, "rejected host message");
                }
            }
        }

        report
    }
}

impl Default for HostInbox {
    fn default() -> Self {
        Self::new(&BridgeConfig::default())
    }
}
