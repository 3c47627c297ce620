//! User-facing [`RealtimeMatch`] API.
//!
//! The tick engine runs on a dedicated background thread at
//! `tick_rate_hz`, while any number of request handlers join players and
//! submit moves concurrently. Engine state and the pending-move buffer sit
//! behind one mutex; snapshots are copied under the lock and published
//! after it is released. A snapshot that was overtaken by a newer one
//! before reaching the sink is not sent.
//!
//! ```text
//! Request handlers                 Tick thread
//!     |                                |
//!     |--join()---------> lock         | recv_timeout(period)
//!     |                   join_player  | lock
//!     |                   snapshot     |   execute_tick
//!     |<-- SpawnResult    unlock       | unlock
//!     |                   publish      | publish
//!     |--submit_move()--> lock         |
//!     |                   resolve or   |
//!     |                   buffer       |
//!     |<-- MoveOutcome    unlock       |
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tilewar_core::{JoinError, MoveCommand, MoveOutcome, PlayerId, SpawnResult, StateSnapshot, TickId};
use tilewar_space::TerrainGrid;

use crate::config::{ConfigError, MatchConfig};
use crate::egress::Broadcast;
use crate::metrics::TickMetrics;
use crate::tick::TickEngine;
use crate::tick_thread::{lock_engine, Publisher, TickThreadState};

// ── SubmitError ──────────────────────────────────────────────────

/// Error returned by [`RealtimeMatch`] request methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The match has been stopped.
    Stopped,
    /// The join could not be satisfied.
    Join(JoinError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "match stopped"),
            Self::Join(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stopped => None,
            Self::Join(e) => Some(e),
        }
    }
}

impl From<JoinError> for SubmitError {
    fn from(e: JoinError) -> Self {
        Self::Join(e)
    }
}

// ── RealtimeMatch ────────────────────────────────────────────────

/// A match ticking on its own thread.
///
/// Dropping the match stops it and joins the tick thread.
pub struct RealtimeMatch {
    engine: Arc<Mutex<TickEngine>>,
    publisher: Arc<Publisher>,
    stop_tx: Sender<()>,
    tick_thread: Option<JoinHandle<u64>>,
    broadcast_on_move: bool,
}

impl RealtimeMatch {
    /// Build the engine and start the tick thread.
    pub fn start(
        grid: TerrainGrid,
        config: MatchConfig,
        sink: Arc<dyn Broadcast>,
    ) -> Result<Self, ConfigError> {
        Self::with_engine(TickEngine::new(grid, config)?, sink)
    }

    /// Start the tick thread over an existing engine.
    pub fn with_engine(engine: TickEngine, sink: Arc<dyn Broadcast>) -> Result<Self, ConfigError> {
        let period = engine.config().tick_period();
        let broadcast_on_move = engine.config().broadcast_on_move;
        let engine = Arc::new(Mutex::new(engine));
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);

        let publisher = Arc::new(Publisher::new(sink));
        let state = TickThreadState::new(
            Arc::clone(&engine),
            Arc::clone(&publisher),
            stop_rx,
            period,
        );
        let tick_thread = thread::Builder::new()
            .name("tilewar-tick".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        log::info!("realtime match started, tick period {period:?}");

        Ok(Self {
            engine,
            publisher,
            stop_tx,
            tick_thread: Some(tick_thread),
            broadcast_on_move,
        })
    }

    /// Give `player` a home cell and broadcast the resulting state.
    ///
    /// A player who already holds a home gets it back unchanged; the
    /// snapshot is broadcast either way, unless a tick snapshot taken
    /// after it has already gone out.
    pub fn join(&self, player: &PlayerId) -> Result<SpawnResult, SubmitError> {
        let (spawn, seq, snapshot) = {
            let mut engine = lock_engine(&self.engine);
            if !engine.is_running() {
                return Err(SubmitError::Stopped);
            }
            let spawn = engine.join(player)?;
            (spawn, engine.next_publish_seq(), Arc::new(engine.snapshot()))
        };
        self.publisher.publish(&self.engine, seq, &snapshot);
        Ok(spawn)
    }

    /// Resolve or buffer one move.
    pub fn submit_move(&self, cmd: MoveCommand) -> Result<MoveOutcome, SubmitError> {
        let (outcome, snapshot) = {
            let mut engine = lock_engine(&self.engine);
            if !engine.is_running() {
                return Err(SubmitError::Stopped);
            }
            let outcome = engine.submit_move(cmd);
            let snapshot = (self.broadcast_on_move && matches!(outcome, MoveOutcome::Resolved(_)))
                .then(|| (engine.next_publish_seq(), Arc::new(engine.snapshot())));
            (outcome, snapshot)
        };
        if let Some((seq, snapshot)) = snapshot {
            self.publisher.publish(&self.engine, seq, &snapshot);
        }
        Ok(outcome)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        lock_engine(&self.engine).snapshot()
    }

    /// The current tick.
    pub fn current_tick(&self) -> TickId {
        lock_engine(&self.engine).current_tick()
    }

    /// Metrics from the most recent tick.
    pub fn last_metrics(&self) -> TickMetrics {
        lock_engine(&self.engine).last_metrics().clone()
    }

    /// Whether the match is still running.
    pub fn is_running(&self) -> bool {
        lock_engine(&self.engine).is_running()
    }

    /// Stop the match. The tick thread exits at its next wake-up, which
    /// this call triggers immediately. Idempotent.
    pub fn stop(&self) {
        lock_engine(&self.engine).stop();
        // A full channel means a stop is already pending.
        let _ = self.stop_tx.try_send(());
    }

    /// Stop the match and wait for the tick thread to exit.
    ///
    /// Returns the number of ticks the thread executed, or `None` if it
    /// was already joined or panicked.
    pub fn shutdown(&mut self) -> Option<u64> {
        self.stop();
        let handle = self.tick_thread.take()?;
        match handle.join() {
            Ok(ticks) => Some(ticks),
            Err(_) => {
                log::warn!("tick thread panicked");
                None
            }
        }
    }
}

impl Drop for RealtimeMatch {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for RealtimeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeMatch")
            .field("running", &self.is_running())
            .field("tick_thread", &self.tick_thread.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::egress::{BroadcastError, ChannelBroadcast, NullBroadcast};
    use std::time::Duration;
    use tilewar_core::{CellCoord, Direction};

    fn fast_config() -> MatchConfig {
        MatchConfig {
            tick_rate_hz: 200.0,
            ..MatchConfig::default()
        }
    }

    fn grid() -> TerrainGrid {
        TerrainGrid::parse("0000\n0000").unwrap()
    }

    #[test]
    fn ticks_are_broadcast() {
        let sink = Arc::new(ChannelBroadcast::new());
        let rx = sink.subscribe();
        let mut m = RealtimeMatch::start(grid(), fast_config(), sink).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(second.tick > first.tick);
        assert!(m.shutdown().unwrap() >= 2);
    }

    #[test]
    fn join_broadcasts_snapshot() {
        let sink = Arc::new(ChannelBroadcast::new());
        let rx = sink.subscribe();
        let config = MatchConfig {
            tick_rate_hz: 0.1,
            ..MatchConfig::default()
        };
        let m = RealtimeMatch::start(grid(), config, sink).unwrap();
        let spawn = m.join(&PlayerId::new("a")).unwrap();
        let snap = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(snap.tick, TickId(0));
        assert!(snap.cell(spawn.home).unwrap().is_home);
        // Rejoining broadcasts again without changing anything.
        let again = m.join(&PlayerId::new("a")).unwrap();
        assert_eq!(again.home, spawn.home);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn broadcast_on_move_publishes_resolved_moves() {
        let sink = Arc::new(ChannelBroadcast::new());
        let rx = sink.subscribe();
        let config = MatchConfig {
            tick_rate_hz: 0.1,
            broadcast_on_move: true,
            ..MatchConfig::default()
        };
        let m = RealtimeMatch::start(grid(), config, sink).unwrap();
        let spawn = m.join(&PlayerId::new("a")).unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let outcome = m
            .submit_move(MoveCommand::new("a", spawn.home, Direction::Up))
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Resolved(_)));
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn stopped_match_refuses_requests() {
        let mut m = RealtimeMatch::start(grid(), fast_config(), Arc::new(NullBroadcast)).unwrap();
        m.stop();
        m.stop();
        assert!(!m.is_running());
        assert_eq!(m.join(&PlayerId::new("a")), Err(SubmitError::Stopped));
        assert_eq!(
            m.submit_move(MoveCommand::new("a", CellCoord::new(0, 0), Direction::Up)),
            Err(SubmitError::Stopped)
        );
        assert!(m.shutdown().is_some());
        assert!(m.shutdown().is_none());
    }

    #[test]
    fn stop_wakes_a_slow_tick_thread() {
        let config = MatchConfig {
            tick_rate_hz: 0.01,
            ..MatchConfig::default()
        };
        let mut m = RealtimeMatch::start(grid(), config, Arc::new(NullBroadcast)).unwrap();
        let started = std::time::Instant::now();
        assert_eq!(m.shutdown(), Some(0));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(m.current_tick(), TickId(0));
    }

    #[test]
    fn failing_sink_is_counted_not_fatal() {
        let sink = |_: &Arc<StateSnapshot>| -> Result<(), BroadcastError> {
            Err(BroadcastError::Failed {
                reason: "offline".into(),
            })
        };
        let mut m = RealtimeMatch::start(grid(), fast_config(), Arc::new(sink)).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert!(m.is_running());
        m.shutdown();
        assert!(m.last_metrics().total_broadcast_failures >= 1);
    }
}
