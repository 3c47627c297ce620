//! Snapshot egress: the boundary between the engine and the transport.
//!
//! The realtime driver hands every snapshot to a [`Broadcast`] sink after
//! releasing the engine lock. A failing sink is logged and counted but
//! never stops the tick loop.
//!
//! [`ChannelBroadcast`] fans snapshots out to any number of crossbeam
//! receivers; closures implement [`Broadcast`] directly for ad-hoc sinks.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tilewar_core::StateSnapshot;

// ── BroadcastError ───────────────────────────────────────────────

/// Error reported by a [`Broadcast`] sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastError {
    /// Some subscribers were too slow and missed this snapshot.
    Lagging {
        /// Number of subscribers that missed the snapshot.
        missed: usize,
    },
    /// The transport failed.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lagging { missed } => {
                write!(f, "{missed} subscriber(s) lagging, snapshot skipped")
            }
            Self::Failed { reason } => write!(f, "broadcast failed: {reason}"),
        }
    }
}

impl std::error::Error for BroadcastError {}

// ── Broadcast ────────────────────────────────────────────────────

/// Destination for state snapshots.
///
/// Implementations must be cheap to call: the tick thread calls
/// [`publish`](Broadcast::publish) once per tick.
pub trait Broadcast: Send + Sync {
    /// Deliver one snapshot to every observer.
    fn publish(&self, snapshot: &Arc<StateSnapshot>) -> Result<(), BroadcastError>;
}

impl<F> Broadcast for F
where
    F: Fn(&Arc<StateSnapshot>) -> Result<(), BroadcastError> + Send + Sync,
{
    fn publish(&self, snapshot: &Arc<StateSnapshot>) -> Result<(), BroadcastError> {
        self(snapshot)
    }
}

/// Sink that discards every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBroadcast;

impl Broadcast for NullBroadcast {
    fn publish(&self, _snapshot: &Arc<StateSnapshot>) -> Result<(), BroadcastError> {
        Ok(())
    }
}

// ── ChannelBroadcast ─────────────────────────────────────────────

/// Fan-out sink backed by one crossbeam channel per subscriber.
///
/// Subscribers whose receiver has been dropped are pruned on the next
/// publish. Bounded subscribers that are full miss the snapshot; since
/// every snapshot fully replaces the previous one, they catch up on the
/// next.
#[derive(Debug, Default)]
pub struct ChannelBroadcast {
    subscribers: Mutex<Vec<Sender<Arc<StateSnapshot>>>>,
}

impl ChannelBroadcast {
    /// Create a sink with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber with an unbounded queue.
    pub fn subscribe(&self) -> Receiver<Arc<StateSnapshot>> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.add(tx);
        rx
    }

    /// Add a subscriber that holds at most `capacity` undelivered snapshots.
    pub fn subscribe_bounded(&self, capacity: usize) -> Receiver<Arc<StateSnapshot>> {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        self.add(tx);
        rx
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn add(&self, tx: Sender<Arc<StateSnapshot>>) {
        self.lock().push(tx);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Arc<StateSnapshot>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Broadcast for ChannelBroadcast {
    fn publish(&self, snapshot: &Arc<StateSnapshot>) -> Result<(), BroadcastError> {
        let mut missed = 0;
        self.lock().retain(|tx| match tx.try_send(Arc::clone(snapshot)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                missed += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        if missed > 0 {
            return Err(BroadcastError::Lagging { missed });
        }
        Ok(())
    }
}
