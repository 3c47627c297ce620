//! Lockstep (synchronous) match driver.
//!
//! [`LockstepMatch`] is the caller-driven counterpart of
//! [`RealtimeMatch`](crate::RealtimeMatch): there is no background thread
//! and each [`step()`](LockstepMatch::step) runs exactly one tick. With a
//! fixed seed and the same sequence of calls, two lockstep matches
//! produce identical snapshots, which makes this the mode for tests,
//! bots, and offline simulation.

use tilewar_core::{JoinError, MoveCommand, MoveOutcome, PlayerId, SpawnResult, StateSnapshot, TickId};
use tilewar_space::TerrainGrid;

use crate::config::{ConfigError, MatchConfig};
use crate::state::MatchState;
use crate::tick::{TickEngine, TickError, TickResult};

// Compile-time assertion: LockstepMatch can be moved to another thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepMatch>();
    }
};

/// Single-threaded match for lockstep execution.
///
/// # Example
///
/// ```
/// use tilewar_core::{Direction, MoveCommand, PlayerId};
/// use tilewar_engine::{LockstepMatch, MatchConfig};
/// use tilewar_space::TerrainGrid;
///
/// let grid = TerrainGrid::parse("00000\n00000\n00000").unwrap();
/// let mut game = LockstepMatch::new(grid, MatchConfig::default()).unwrap();
/// let me = PlayerId::new("me");
/// let home = game.join(&me).unwrap().home;
/// for _ in 0..3 {
///     game.step().unwrap();
/// }
/// assert_eq!(game.snapshot().cell(home).unwrap().army, 4);
/// ```
#[derive(Debug)]
pub struct LockstepMatch {
    engine: TickEngine,
}

impl LockstepMatch {
    /// Create a match over `grid`. Validates `config`.
    pub fn new(grid: TerrainGrid, config: MatchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: TickEngine::new(grid, config)?,
        })
    }

    /// Wrap an existing engine.
    pub fn from_engine(engine: TickEngine) -> Self {
        Self { engine }
    }

    /// Give `player` a home cell.
    pub fn join(&mut self, player: &PlayerId) -> Result<SpawnResult, JoinError> {
        self.engine.join(player)
    }

    /// Resolve or buffer one move.
    pub fn submit_move(&mut self, cmd: MoveCommand) -> MoveOutcome {
        self.engine.submit_move(cmd)
    }

    /// Submit a batch of moves in order and return their outcomes.
    pub fn submit_moves(&mut self, cmds: impl IntoIterator<Item = MoveCommand>) -> Vec<MoveOutcome> {
        cmds.into_iter().map(|c| self.engine.submit_move(c)).collect()
    }

    /// Execute one tick.
    pub fn step(&mut self) -> Result<TickResult, TickError> {
        self.engine.execute_tick()
    }

    /// Execute `n` ticks and return the last result.
    ///
    /// Returns `Ok(None)` when `n` is zero.
    pub fn step_n(&mut self, n: u64) -> Result<Option<TickResult>, TickError> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.engine.execute_tick()?);
        }
        Ok(last)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        self.engine.snapshot()
    }

    /// The current tick.
    pub fn current_tick(&self) -> TickId {
        self.engine.current_tick()
    }

    /// Read access to the match state.
    pub fn state(&self) -> &MatchState {
        self.engine.state()
    }

    /// Stop the match.
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// The underlying engine.
    pub fn engine(&self) -> &TickEngine {
        &self.engine
    }

    /// Consume the match and return the engine.
    pub fn into_engine(self) -> TickEngine {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewar_core::{CellCoord, Direction, MoveEffect, MoveRejection, Resolution};

    fn game(map: &str, seed: u64) -> LockstepMatch {
        let config = MatchConfig {
            seed,
            ..MatchConfig::default()
        };
        LockstepMatch::new(TerrainGrid::parse(map).unwrap(), config).unwrap()
    }

    #[test]
    fn step_n_zero_is_none() {
        let mut g = game("0", 0);
        assert!(g.step_n(0).unwrap().is_none());
        assert_eq!(g.step_n(4).unwrap().unwrap().snapshot.tick, TickId(4));
    }

    #[test]
    fn batch_submit_preserves_order() {
        let mut g = game("000", 0);
        let home = g.join(&PlayerId::new("a")).unwrap().home;
        g.step_n(3).unwrap();
        let dir = if home.col == 0 {
            Direction::Right
        } else {
            Direction::Left
        };
        let outcomes = g.submit_moves([
            MoveCommand::new("a", home, dir),
            MoveCommand::new("a", home, dir),
        ]);
        assert!(matches!(
            outcomes[0],
            MoveOutcome::Resolved(Resolution::Applied(MoveEffect::Claimed { army: 3 }))
        ));
        assert_eq!(outcomes[1], MoveOutcome::Buffered { replaced: false });
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let run = || {
            let mut g = game("00000\n02010\n00000", 21);
            let players: Vec<_> = ["a", "b"].into_iter().map(PlayerId::new).collect();
            let homes: Vec<CellCoord> = players.iter().map(|p| g.join(p).unwrap().home).collect();
            for t in 0..30 {
                for (p, home) in players.iter().zip(&homes) {
                    let d = Direction::ALL[t % 4];
                    g.submit_move(MoveCommand::new(p.clone(), *home, d));
                }
                g.step().unwrap();
            }
            g.snapshot()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn stop_ends_stepping() {
        let mut g = game("0", 0);
        g.step().unwrap();
        g.stop();
        assert_eq!(g.step().unwrap_err(), TickError::Stopped);
        assert_eq!(g.into_engine().current_tick(), TickId(1));
    }

    #[test]
    fn stopped_match_ignores_moves() {
        let mut g = game("000", 0);
        let home = g.join(&PlayerId::new("a")).unwrap().home;
        g.step_n(3).unwrap();
        g.stop();
        let dir = if home.col == 0 {
            Direction::Right
        } else {
            Direction::Left
        };
        let before = g.snapshot();
        assert_eq!(
            g.submit_move(MoveCommand::new("a", home, dir)),
            MoveOutcome::Rejected(MoveRejection::MatchStopped)
        );
        assert_eq!(g.snapshot(), before);
    }
}
