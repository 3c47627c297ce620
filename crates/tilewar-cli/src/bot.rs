//! Random-walk bots that drive headless matches.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tilewar_core::{CellCoord, MoveCommand, PlayerId, StateSnapshot};
use tilewar_space::TerrainGrid;

/// A bot that pushes armies from random cells toward random open
/// neighbours. It never attacks enemy cells, since that only loses units.
pub(crate) struct RandomWalkBot {
    player: PlayerId,
    rng: ChaCha8Rng,
}

impl RandomWalkBot {
    pub(crate) fn new(player: PlayerId, seed: u64) -> Self {
        Self {
            player,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Up to `max_moves` moves for this tick, from distinct origins.
    pub(crate) fn plan(
        &mut self,
        grid: &TerrainGrid,
        snapshot: &StateSnapshot,
        max_moves: usize,
    ) -> Vec<MoveCommand> {
        let mut movable: Vec<CellCoord> = snapshot
            .cells
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.owner.as_ref() == Some(&self.player) && c.army > 1)
                    .map(move |(col, _)| CellCoord::new(row, col))
            })
            .collect();
        movable.shuffle(&mut self.rng);

        let mut out = Vec::with_capacity(max_moves);
        for origin in movable {
            if out.len() == max_moves {
                break;
            }
            let targets: Vec<_> = grid
                .passable_neighbours(origin)
                .into_iter()
                .filter(|(_, to)| {
                    snapshot
                        .cell(*to)
                        .is_some_and(|c| c.owner.is_none() || c.owner.as_ref() == Some(&self.player))
                })
                .collect();
            if let Some((dir, _)) = targets.choose(&mut self.rng) {
                out.push(MoveCommand::new(self.player.clone(), origin, *dir));
            }
        }
        out
    }
}
