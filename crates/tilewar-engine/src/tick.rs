//! Tick engine: the single-threaded match loop.
//!
//! [`TickEngine`] owns the match state, the pending-move buffer, the RNG
//! and the configuration, and executes the per-tick pipeline:
//!
//! 1. clear every moved flag;
//! 2. drain and resolve buffered moves in row-major origin order;
//! 3. advance the tick counter;
//! 4. grow owned homes and strongholds, plus the periodic bonus;
//! 5. copy out a snapshot.
//!
//! Every method takes `&mut self` or `&self`; the engine does no locking.
//! [`LockstepMatch`](crate::LockstepMatch) drives it directly and
//! [`RealtimeMatch`](crate::RealtimeMatch) wraps it in a mutex.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tilewar_core::{
    JoinError, MoveCommand, MoveOutcome, MoveRejection, PlayerId, Resolution, SpawnResult,
    StateSnapshot, TickId,
};
use tilewar_space::TerrainGrid;

use crate::buffer::CommandBuffer;
use crate::config::{ConfigError, MatchConfig};
use crate::join::join_player;
use crate::metrics::TickMetrics;
use crate::resolve::resolve_move;
use crate::state::MatchState;

// ── TickResult ───────────────────────────────────────────────────

/// Result of a successful tick.
#[derive(Debug, Clone)]
pub struct TickResult {
    /// State after the tick, shared with broadcast subscribers.
    pub snapshot: Arc<StateSnapshot>,
    /// Metrics for this tick.
    pub metrics: TickMetrics,
}

// ── TickError ───────────────────────────────────────────────────

/// Error returned by [`TickEngine::execute_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickError {
    /// The match has been stopped; no further ticks run.
    Stopped,
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "match stopped"),
        }
    }
}

impl std::error::Error for TickError {}

// ── TickEngine ───────────────────────────────────────────────────

/// Single-threaded match engine.
///
/// # Examples
///
/// ```
/// use tilewar_core::{CellCoord, Direction, MoveCommand, PlayerId};
/// use tilewar_engine::{MatchConfig, TickEngine};
/// use tilewar_space::TerrainGrid;
///
/// let grid = TerrainGrid::parse("000\n000").unwrap();
/// let mut engine = TickEngine::new(grid, MatchConfig::default()).unwrap();
/// let alice = PlayerId::new("alice");
/// let spawn = engine.join(&alice).unwrap();
///
/// let result = engine.execute_tick().unwrap();
/// assert_eq!(result.snapshot.cell(spawn.home).unwrap().army, 2);
/// ```
pub struct TickEngine {
    state: MatchState,
    buffer: CommandBuffer,
    rng: ChaCha8Rng,
    config: MatchConfig,
    last_metrics: TickMetrics,
    publish_seq: u64,
}

impl TickEngine {
    /// Build an engine over `grid`.
    ///
    /// Validates `config`, then seeds the RNG from `config.seed` and draws
    /// the stronghold garrisons.
    pub fn new(grid: TerrainGrid, config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let state = MatchState::new(grid, config.stronghold_army(), &mut rng);
        Ok(Self::assemble(state, rng, config))
    }

    /// Build an engine around a prepared state, such as a test scenario.
    ///
    /// The RNG is seeded from `config.seed` as in [`new`](Self::new); the
    /// state is taken as-is and not checked against the configuration.
    pub fn from_state(state: MatchState, config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self::assemble(state, rng, config))
    }

    fn assemble(state: MatchState, rng: ChaCha8Rng, config: MatchConfig) -> Self {
        log::info!(
            "match created: {}x{} grid, {} strongholds, seed {}",
            state.width(),
            state.height(),
            state.terrain().count(tilewar_core::Terrain::Stronghold),
            config.seed
        );
        Self {
            state,
            buffer: CommandBuffer::new(),
            rng,
            config,
            last_metrics: TickMetrics::default(),
            publish_seq: 0,
        }
    }

    /// Give `player` a home cell, or report the one they already hold.
    pub fn join(&mut self, player: &PlayerId) -> Result<SpawnResult, JoinError> {
        let result = join_player(&mut self.state, player, self.config.spawn_army, &mut self.rng);
        match &result {
            Ok(spawn) if spawn.newly_spawned => {
                log::info!("player {player} spawned at {}", spawn.home);
            }
            Ok(spawn) => log::debug!("player {player} rejoined, home {}", spawn.home),
            Err(e) => log::info!("player {player} could not join: {e}"),
        }
        result
    }

    /// Submit one move.
    ///
    /// A move from an origin that has not moved this tick is resolved at
    /// once. A move from an origin that already moved is buffered for the
    /// next tick, replacing any earlier buffered move for that origin.
    /// Off-grid or foreign origins are rejected without buffering, and a
    /// stopped match rejects everything.
    pub fn submit_move(&mut self, cmd: MoveCommand) -> MoveOutcome {
        if !self.state.is_running() {
            log::debug!("move from {} rejected: {}", cmd.origin, MoveRejection::MatchStopped);
            return MoveOutcome::Rejected(MoveRejection::MatchStopped);
        }
        let Some(origin) = self.state.cell(cmd.origin) else {
            log::debug!("move from {} rejected: {}", cmd.origin, MoveRejection::OriginOutOfBounds);
            return MoveOutcome::Rejected(MoveRejection::OriginOutOfBounds);
        };
        if !origin.is_owned_by(&cmd.player) {
            log::debug!("move from {} rejected: {}", cmd.origin, MoveRejection::NotOwner);
            return MoveOutcome::Rejected(MoveRejection::NotOwner);
        }

        if origin.moved_this_tick {
            log::debug!(
                "move {} {} by {} buffered for next tick",
                cmd.origin,
                cmd.direction,
                cmd.player
            );
            let replaced = self.buffer.insert(cmd);
            self.last_metrics.total_buffered_moves += 1;
            if replaced {
                self.last_metrics.total_replaced_moves += 1;
            }
            return MoveOutcome::Buffered { replaced };
        }

        let resolution = resolve_move(&mut self.state, &cmd);
        log_resolution(&cmd, &resolution);
        self.last_metrics.total_immediate_moves += 1;
        MoveOutcome::Resolved(resolution)
    }

    /// Execute one tick and return the resulting snapshot.
    pub fn execute_tick(&mut self) -> Result<TickResult, TickError> {
        if !self.state.is_running() {
            return Err(TickError::Stopped);
        }
        let tick_start = Instant::now();
        let mut metrics = TickMetrics {
            total_immediate_moves: self.last_metrics.total_immediate_moves,
            total_buffered_moves: self.last_metrics.total_buffered_moves,
            total_replaced_moves: self.last_metrics.total_replaced_moves,
            total_broadcast_failures: self.last_metrics.total_broadcast_failures,
            ..TickMetrics::default()
        };

        // 1. New tick: nothing has moved yet.
        self.state.reset_moved();

        // 2. Buffered moves, row-major by origin.
        let cmd_start = Instant::now();
        let pending = self.buffer.drain();
        metrics.buffered_drained = pending.len();
        for cmd in &pending {
            let still_eligible = self
                .state
                .cell(cmd.origin)
                .is_some_and(|c| c.is_owned_by(&cmd.player) && !c.moved_this_tick);
            if !still_eligible {
                log::debug!("buffered move from {} dropped: origin changed", cmd.origin);
                metrics.buffered_dropped += 1;
                continue;
            }
            let resolution = resolve_move(&mut self.state, cmd);
            log_resolution(cmd, &resolution);
            if resolution.is_applied() {
                metrics.buffered_applied += 1;
            } else {
                metrics.buffered_rejected += 1;
            }
        }
        metrics.command_processing_us = cmd_start.elapsed().as_micros() as u64;

        // 3. Advance.
        let tick = self.state.advance_tick();

        // 4. Growth and periodic bonus.
        let growth = self.state.apply_growth(self.config.bonus_interval);
        metrics.grown_cells = growth.grown_cells;
        metrics.bonus_applied = tick.0 % self.config.bonus_interval == 0;

        debug_assert!(
            crate::invariants::check_invariants(&self.state).is_empty(),
            "invariants violated after tick {tick}: {:?}",
            crate::invariants::check_invariants(&self.state)
        );

        // 5. Snapshot.
        let snapshot = Arc::new(self.state.snapshot());
        metrics.total_us = tick_start.elapsed().as_micros() as u64;
        log::trace!(
            "tick {tick}: {} buffered ({} applied, {} rejected, {} dropped), {} grown{}",
            metrics.buffered_drained,
            metrics.buffered_applied,
            metrics.buffered_rejected,
            metrics.buffered_dropped,
            metrics.grown_cells,
            if metrics.bonus_applied { ", bonus" } else { "" }
        );
        self.last_metrics = metrics.clone();
        Ok(TickResult { snapshot, metrics })
    }

    /// Stop the match. Subsequent ticks fail with [`TickError::Stopped`].
    pub fn stop(&mut self) {
        if self.state.is_running() {
            log::info!("match stopped at tick {}", self.state.tick());
        }
        self.state.stop();
    }

    /// Whether the match is still running.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Copy of the current public state.
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// The current tick.
    pub fn current_tick(&self) -> TickId {
        self.state.tick()
    }

    /// Read access to the match state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// The validated configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Number of buffered moves awaiting the next tick.
    pub fn pending_moves(&self) -> usize {
        self.buffer.len()
    }

    /// Metrics from the most recent tick, with cumulative counters.
    pub fn last_metrics(&self) -> &TickMetrics {
        &self.last_metrics
    }

    /// Stamp for a snapshot about to be published; strictly increasing.
    pub(crate) fn next_publish_seq(&mut self) -> u64 {
        self.publish_seq += 1;
        self.publish_seq
    }

    pub(crate) fn record_broadcast_failure(&mut self) {
        self.last_metrics.total_broadcast_failures += 1;
    }
}

impl fmt::Debug for TickEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickEngine")
            .field("tick", &self.state.tick())
            .field("running", &self.state.is_running())
            .field("pending_moves", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

fn log_resolution(cmd: &MoveCommand, resolution: &Resolution) {
    match resolution {
        Resolution::Applied(effect) => log::debug!(
            "move {} {} by {} applied: {effect:?}",
            cmd.origin,
            cmd.direction,
            cmd.player
        ),
        Resolution::Rejected(reason) => log::debug!(
            "move {} {} by {} rejected: {reason}",
            cmd.origin,
            cmd.direction,
            cmd.player
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewar_core::{CellCoord, Direction, MoveEffect};

    fn engine(map: &str) -> TickEngine {
        TickEngine::new(TerrainGrid::parse(map).unwrap(), MatchConfig::default()).unwrap()
    }

    fn place(engine: &mut TickEngine, player: &str, at: CellCoord, army: u32) {
        let cell = engine.state.cell_mut(at).unwrap();
        cell.owner = Some(PlayerId::new(player));
        cell.army = army;
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = MatchConfig {
            spawn_army: 0,
            ..MatchConfig::default()
        };
        let err = TickEngine::new(TerrainGrid::parse("0").unwrap(), cfg).unwrap_err();
        assert_eq!(err, ConfigError::ZeroSpawnArmy);
    }

    #[test]
    fn tick_advances_and_grows_home() {
        let mut e = engine("000");
        let spawn = e.join(&PlayerId::new("a")).unwrap();
        let r = e.execute_tick().unwrap();
        assert_eq!(r.snapshot.tick, TickId(1));
        assert_eq!(r.snapshot.cell(spawn.home).unwrap().army, 2);
        assert_eq!(r.metrics.grown_cells, 1);
        assert!(!r.metrics.bonus_applied);
    }

    #[test]
    fn foreign_and_offgrid_origins_are_not_buffered() {
        let mut e = engine("00");
        place(&mut e, "a", CellCoord::new(0, 0), 3);
        assert_eq!(
            e.submit_move(MoveCommand::new("a", CellCoord::new(4, 0), Direction::Up)),
            MoveOutcome::Rejected(MoveRejection::OriginOutOfBounds)
        );
        assert_eq!(
            e.submit_move(MoveCommand::new("b", CellCoord::new(0, 0), Direction::Right)),
            MoveOutcome::Rejected(MoveRejection::NotOwner)
        );
        assert_eq!(e.pending_moves(), 0);
    }

    #[test]
    fn second_move_from_origin_is_buffered_then_applied() {
        let mut e = engine("000");
        let origin = CellCoord::new(0, 1);
        place(&mut e, "a", origin, 5);
        let first = e.submit_move(MoveCommand::new("a", origin, Direction::Right));
        assert_eq!(
            first,
            MoveOutcome::Resolved(Resolution::Applied(MoveEffect::Claimed { army: 4 }))
        );
        let second = e.submit_move(MoveCommand::new("a", origin, Direction::Left));
        assert_eq!(second, MoveOutcome::Buffered { replaced: false });
        assert_eq!(e.pending_moves(), 1);

        // Reinforce the origin so the buffered move has units to send.
        e.state.cell_mut(origin).unwrap().army = 3;
        let r = e.execute_tick().unwrap();
        assert_eq!(r.metrics.buffered_applied, 1);
        assert_eq!(r.snapshot.cell(CellCoord::new(0, 0)).unwrap().army, 2);
        assert_eq!(r.snapshot.cell(origin).unwrap().army, 1);
        assert_eq!(e.pending_moves(), 0);
    }

    #[test]
    fn buffered_move_dropped_when_origin_changes_hands() {
        let mut e = engine("000");
        let origin = CellCoord::new(0, 1);
        place(&mut e, "a", origin, 5);
        e.submit_move(MoveCommand::new("a", origin, Direction::Right));
        e.submit_move(MoveCommand::new("a", origin, Direction::Left));
        place(&mut e, "b", origin, 5);
        let r = e.execute_tick().unwrap();
        assert_eq!(r.metrics.buffered_dropped, 1);
        assert_eq!(r.snapshot.cell(origin).unwrap().army, 5);
    }

    #[test]
    fn moved_flags_clear_each_tick() {
        let mut e = engine("00");
        place(&mut e, "a", CellCoord::new(0, 0), 4);
        e.submit_move(MoveCommand::new("a", CellCoord::new(0, 0), Direction::Right));
        assert!(e.state.cell(CellCoord::new(0, 0)).unwrap().moved_this_tick);
        e.execute_tick().unwrap();
        assert!(e.state.cells().all(|(_, c)| !c.moved_this_tick));
    }

    #[test]
    fn cumulative_counters_survive_ticks() {
        let mut e = engine("000");
        let origin = CellCoord::new(0, 1);
        place(&mut e, "a", origin, 9);
        e.submit_move(MoveCommand::new("a", origin, Direction::Right));
        e.submit_move(MoveCommand::new("a", origin, Direction::Left));
        e.submit_move(MoveCommand::new("a", origin, Direction::Left));
        e.execute_tick().unwrap();
        let m = e.last_metrics();
        assert_eq!(m.total_immediate_moves, 1);
        assert_eq!(m.total_buffered_moves, 2);
        assert_eq!(m.total_replaced_moves, 1);
        e.execute_tick().unwrap();
        assert_eq!(e.last_metrics().total_buffered_moves, 2);
    }

    #[test]
    fn stopped_engine_does_not_tick() {
        let mut e = engine("0");
        e.stop();
        assert!(!e.is_running());
        assert_eq!(e.execute_tick().unwrap_err(), TickError::Stopped);
        assert_eq!(e.current_tick(), TickId(0));
    }

    #[test]
    fn stopped_engine_rejects_moves_without_mutation() {
        let mut e = engine("000");
        let origin = CellCoord::new(0, 1);
        place(&mut e, "a", origin, 5);
        e.submit_move(MoveCommand::new("a", origin, Direction::Right));
        e.stop();
        let before = e.snapshot();
        for dir in [Direction::Left, Direction::Right] {
            assert_eq!(
                e.submit_move(MoveCommand::new("a", origin, dir)),
                MoveOutcome::Rejected(MoveRejection::MatchStopped)
            );
        }
        assert_eq!(e.snapshot(), before);
        assert_eq!(e.pending_moves(), 0);
    }

    #[test]
    fn same_seed_same_spawns() {
        let grid = TerrainGrid::parse("0000\n0200\n0000").unwrap();
        let cfg = MatchConfig {
            seed: 11,
            ..MatchConfig::default()
        };
        let mut a = TickEngine::new(grid.clone(), cfg.clone()).unwrap();
        let mut b = TickEngine::new(grid, cfg).unwrap();
        for p in ["x", "y", "z"] {
            assert_eq!(a.join(&PlayerId::new(p)), b.join(&PlayerId::new(p)));
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
