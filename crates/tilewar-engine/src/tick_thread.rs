//! Tick loop for realtime mode.
//!
//! The tick thread shares [`TickEngine`] with request handlers through one
//! mutex. Each iteration waits for the next deadline on the stop channel,
//! locks the engine, runs one tick, releases the lock, and only then
//! publishes the snapshot. A stop signal wakes the wait immediately.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tilewar_core::StateSnapshot;

use crate::egress::Broadcast;
use crate::tick::TickEngine;

/// Lock the shared engine, recovering from poisoning.
///
/// Every critical section leaves the engine consistent before it can
/// panic, so a poisoned guard is still safe to use.
pub(crate) fn lock_engine(engine: &Mutex<TickEngine>) -> MutexGuard<'_, TickEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hands snapshots to the broadcast sink in the order they were taken.
///
/// Every snapshot is stamped with `TickEngine::next_publish_seq` while
/// the engine lock is held. A snapshot whose stamp is not newer than the
/// last one delivered is dropped, so a join snapshot that lost the race
/// with the next tick never rolls clients back.
pub(crate) struct Publisher {
    sink: Arc<dyn Broadcast>,
    last_seq: Mutex<u64>,
}

impl Publisher {
    pub fn new(sink: Arc<dyn Broadcast>) -> Self {
        Self {
            sink,
            last_seq: Mutex::new(0),
        }
    }

    /// Publish `snapshot` unless something newer already went out.
    /// Failures are logged and counted on the engine.
    ///
    /// Returns `false` when the snapshot was superseded and not sent.
    pub fn publish(
        &self,
        engine: &Mutex<TickEngine>,
        seq: u64,
        snapshot: &Arc<StateSnapshot>,
    ) -> bool {
        let result = {
            let mut last = self.last_seq.lock().unwrap_or_else(PoisonError::into_inner);
            if seq <= *last {
                log::trace!("snapshot for tick {} superseded, not sent", snapshot.tick);
                return false;
            }
            *last = seq;
            self.sink.publish(snapshot)
        };
        // The engine lock is taken only after the sequence lock is released.
        if let Err(e) = result {
            log::warn!("snapshot for tick {} not delivered: {e}", snapshot.tick);
            lock_engine(engine).record_broadcast_failure();
        }
        true
    }
}

pub(crate) struct TickThreadState {
    engine: Arc<Mutex<TickEngine>>,
    publisher: Arc<Publisher>,
    stop_rx: Receiver<()>,
    period: Duration,
}

impl TickThreadState {
    pub fn new(
        engine: Arc<Mutex<TickEngine>>,
        publisher: Arc<Publisher>,
        stop_rx: Receiver<()>,
        period: Duration,
    ) -> Self {
        Self {
            engine,
            publisher,
            stop_rx,
            period,
        }
    }

    /// Run until stopped. Returns the number of ticks executed.
    pub fn run(self) -> u64 {
        let mut ticks = 0;
        let mut deadline = Instant::now() + self.period;
        loop {
            // 1. Sleep until the deadline; a stop message or a dropped
            //    sender ends the loop early.
            let wait = deadline.saturating_duration_since(Instant::now());
            match self.stop_rx.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            // 2. Tick under the lock.
            let result = {
                let mut engine = lock_engine(&self.engine);
                if !engine.is_running() {
                    break;
                }
                engine
                    .execute_tick()
                    .map(|result| (engine.next_publish_seq(), result))
            };
            let Ok((seq, result)) = result else {
                break;
            };
            ticks += 1;

            // 3. Publish outside the lock.
            self.publisher.publish(&self.engine, seq, &result.snapshot);

            // Keep a fixed cadence; if a tick overran, start the next
            // period from now rather than bursting to catch up.
            deadline += self.period;
            let now = Instant::now();
            if deadline < now {
                deadline = now + self.period;
            }
        }
        log::debug!("tick thread exiting after {ticks} ticks");
        ticks
    }
}
