//! Bounded-timeout fan-out of change events to subscribers.

use futures::future::join_all;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a publish waits for a subscriber slot before abandoning delivery.
pub(crate) const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// The kind of change that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The document was written or replaced; the event content holds the new
    /// bytes.
    Put,
    /// The document was removed. The file provider only observes write-class
    /// events and never emits this today; it exists so providers that do
    /// observe removals can report them.
    Removed,
}

/// A change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The path exactly as the caller registered it.
    pub path: String,
    /// What happened to the document.
    pub kind: ChangeKind,
    /// The full content of the document after the change.
    pub content: Vec<u8>,
}

/// Stream of change events owned by one subscriber.
///
/// Returned by [`Provider::watch`](crate::provider::Provider::watch). The
/// stream ends (`recv` returns `None`) when the subscription's cancellation
/// token fires, when the provider shuts down, or immediately if there was
/// nothing to watch.
pub struct WatchStream {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl WatchStream {
    /// Receive the next change event, or `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Create a stream that is already closed.
    ///
    /// Useful for [`Provider`](crate::provider::Provider) implementations
    /// that have nothing to watch for a given key.
    pub fn closed() -> Self {
        let (_tx, rx) = mpsc::channel(1);
        Self { rx }
    }

    /// Create a stream that yields the given events and then closes.
    #[cfg(test)]
    pub(crate) fn queued(events: Vec<ChangeEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            let _ = tx.try_send(event);
        }
        Self { rx }
    }
}

/// A capacity-one delivery slot with a bounded send timeout.
///
/// This is the single backpressure primitive used for every publish: a slot
/// that does not accept the event within the window loses it.
#[derive(Clone)]
struct TimeoutSlot {
    tx: mpsc::Sender<ChangeEvent>,
    timeout: Duration,
}

impl TimeoutSlot {
    /// Offer an event to the slot. Returns whether it was accepted.
    async fn offer(&self, event: ChangeEvent) -> bool {
        match self.tx.send_timeout(event, self.timeout).await {
            Ok(()) => true,
            Err(SendTimeoutError::Timeout(_)) | Err(SendTimeoutError::Closed(_)) => false,
        }
    }
}

/// Per-path fan-out point for genuine changes.
///
/// Each active subscription owns one [`TimeoutSlot`]; publishing offers the
/// event to every slot concurrently, so a stalled subscriber cannot starve the
/// others and the publisher blocks for at most one timeout window.
pub(crate) struct Broadcaster {
    slots: Mutex<Vec<TimeoutSlot>>,
    timeout: Duration,
}

impl Broadcaster {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            timeout,
        }
    }

    /// Publish an event to every active subscriber, returning how many
    /// accepted it within the timeout window.
    pub(crate) async fn publish(&self, event: ChangeEvent) -> usize {
        let slots: Vec<TimeoutSlot> = {
            let mut slots = self.slots.lock();
            slots.retain(|slot| !slot.tx.is_closed());
            slots.clone()
        };
        if slots.is_empty() {
            return 0;
        }

        let offered = slots.len();
        let offers = slots.iter().map(|slot| slot.offer(event.clone()));
        let delivered = join_all(offers).await.into_iter().filter(|ok| *ok).count();
        if delivered < offered {
            debug!(
                path = %event.path,
                delivered,
                offered,
                "dropped change notification for slow subscribers"
            );
        }
        delivered
    }

    /// Attach a new subscriber bound to the given cancellation token.
    ///
    /// Spawns a forwarding task that copies events from the subscriber's slot
    /// into the returned stream until the token is canceled or the stream is
    /// dropped.
    pub(crate) fn subscribe(&self, cancel: CancellationToken) -> WatchStream {
        let (slot_tx, slot_rx) = mpsc::channel(1);
        let (out_tx, out_rx) = mpsc::channel(1);
        self.slots.lock().push(TimeoutSlot {
            tx: slot_tx,
            timeout: self.timeout,
        });
        tokio::spawn(forward(slot_rx, out_tx, cancel));
        WatchStream { rx: out_rx }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        let mut slots = self.slots.lock();
        slots.retain(|slot| !slot.tx.is_closed());
        slots.len()
    }
}

/// Copy events from a subscription's slot into its output channel until the
/// subscription is canceled or either side closes.
async fn forward(
    mut slot_rx: mpsc::Receiver<ChangeEvent>,
    out_tx: mpsc::Sender<ChangeEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            received = slot_rx.recv() => match received {
                Some(event) => event,
                None => break,
            },
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = out_tx.send(event) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    // Dropping slot_rx detaches the slot; publish prunes it on the next change.
}
