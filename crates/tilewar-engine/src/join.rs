//! Spawn assignment for joining players.

use rand::seq::IndexedRandom;
use rand::Rng;
use tilewar_core::{JoinError, PlayerId, SpawnResult};

use crate::state::MatchState;

/// Give `player` a home cell.
///
/// A player who already holds a home keeps it and nothing changes.
/// Otherwise one open, unowned cell is chosen uniformly at random and
/// becomes the player's home with `spawn_army` units.
pub fn join_player<R: Rng + ?Sized>(
    state: &mut MatchState,
    player: &PlayerId,
    spawn_army: u32,
    rng: &mut R,
) -> Result<SpawnResult, JoinError> {
    if let Some(home) = state.home_of(player) {
        return Ok(SpawnResult {
            home,
            newly_spawned: false,
        });
    }
    let candidates = state.spawn_candidates();
    let home = *candidates.choose(rng).ok_or(JoinError::NoSpawnAvailable)?;
    let cell = state
        .cell_mut(home)
        .ok_or(JoinError::NoSpawnAvailable)?;
    cell.owner = Some(player.clone());
    cell.army = spawn_army;
    cell.is_home = true;
    Ok(SpawnResult {
        home,
        newly_spawned: true,
    })
}
