//! Test fixtures and scenario builders for tilewar development.
//!
//! [`Scenario`] builds a match with players placed at exact cells, which
//! random spawning cannot give. The free functions are shorthands used
//! throughout the integration tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tilewar_core::{CellCoord, Direction, MoveCommand, PlayerId, Terrain};
use tilewar_engine::{LockstepMatch, MatchConfig, MatchState, TickEngine};
use tilewar_space::TerrainGrid;

pub fn c(row: usize, col: usize) -> CellCoord {
    CellCoord::new(row, col)
}

pub fn mv(player: &str, row: usize, col: usize, direction: Direction) -> MoveCommand {
    MoveCommand::new(player, c(row, col), direction)
}

/// Parse map text, panicking on malformed input.
pub fn grid(text: &str) -> TerrainGrid {
    TerrainGrid::parse(text).unwrap_or_else(|e| panic!("bad test map: {e}"))
}

/// An all-open `width` x `height` grid.
pub fn open_grid(width: usize, height: usize) -> TerrainGrid {
    TerrainGrid::from_rows(vec![vec![Terrain::Open; width]; height])
        .unwrap_or_else(|e| panic!("bad test grid: {e}"))
}

/// Every cell is a stronghold or obstacle; nobody can spawn.
pub fn full_grid(width: usize, height: usize) -> TerrainGrid {
    let rows = (0..height)
        .map(|r| {
            (0..width)
                .map(|col| {
                    if (r + col) % 2 == 0 {
                        Terrain::Obstacle
                    } else {
                        Terrain::Stronghold
                    }
                })
                .collect()
        })
        .collect();
    TerrainGrid::from_rows(rows).unwrap_or_else(|e| panic!("bad test grid: {e}"))
}

struct Placement {
    player: PlayerId,
    at: CellCoord,
    army: u32,
    home: bool,
}

/// Builder for a match with hand-placed cells.
pub struct Scenario {
    grid: TerrainGrid,
    config: MatchConfig,
    placements: Vec<Placement>,
    garrisons: Vec<(CellCoord, u32)>,
}

impl Scenario {
    pub fn new(grid: TerrainGrid) -> Self {
        Self {
            grid,
            config: MatchConfig::default(),
            placements: Vec::new(),
            garrisons: Vec::new(),
        }
    }

    pub fn map(text: &str) -> Self {
        Self::new(grid(text))
    }

    pub fn open(width: usize, height: usize) -> Self {
        Self::new(open_grid(width, height))
    }

    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Place `player`'s home at `at`.
    pub fn home(mut self, player: &str, at: CellCoord, army: u32) -> Self {
        self.placements.push(Placement {
            player: PlayerId::new(player),
            at,
            army,
            home: true,
        });
        self
    }

    /// Give `player` an ordinary cell at `at`.
    pub fn owned(mut self, player: &str, at: CellCoord, army: u32) -> Self {
        self.placements.push(Placement {
            player: PlayerId::new(player),
            at,
            army,
            home: false,
        });
        self
    }

    /// Override the garrison of an unowned cell (usually a stronghold).
    pub fn garrison(mut self, at: CellCoord, army: u32) -> Self {
        self.garrisons.push((at, army));
        self
    }

    pub fn build_state(&self) -> MatchState {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut state = MatchState::new(self.grid.clone(), self.config.stronghold_army(), &mut rng);
        for &(at, army) in &self.garrisons {
            let cell = state
                .cell_mut(at)
                .unwrap_or_else(|| panic!("garrison {at} off grid"));
            cell.army = army;
        }
        for p in &self.placements {
            let cell = state
                .cell_mut(p.at)
                .unwrap_or_else(|| panic!("placement {} off grid", p.at));
            cell.owner = Some(p.player.clone());
            cell.army = p.army;
            cell.is_home = p.home;
        }
        state
    }

    pub fn build_engine(&self) -> TickEngine {
        TickEngine::from_state(self.build_state(), self.config.clone())
            .unwrap_or_else(|e| panic!("bad test config: {e}"))
    }

    pub fn build(&self) -> LockstepMatch {
        LockstepMatch::from_engine(self.build_engine())
    }
}
