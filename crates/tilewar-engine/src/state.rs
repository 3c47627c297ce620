//! Mutable match state: the cell grid, tick counter, and running flag.
//!
//! [`MatchState`] is plain data plus the per-tick bookkeeping passes
//! (moved-flag reset and growth). It performs no locking itself; the
//! owner ([`TickEngine`](crate::tick::TickEngine)) is responsible for
//! exclusivity.

use rand::Rng;
use tilewar_core::{Cell, CellCoord, CellView, PlayerId, StateSnapshot, Terrain, TickId};
use tilewar_space::TerrainGrid;

/// Counts produced by one growth pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Owned homes and strongholds that gained a unit.
    pub grown_cells: usize,
    /// Owned cells that gained the periodic bonus unit (0 on non-bonus ticks).
    pub bonus_cells: usize,
}

/// The grid of cells plus tick counter and running flag.
#[derive(Clone, Debug)]
pub struct MatchState {
    terrain: TerrainGrid,
    cells: Vec<Cell>,
    tick: TickId,
    running: bool,
}

impl MatchState {
    /// Initialize every cell from `terrain`.
    ///
    /// Strongholds receive a garrison drawn uniformly from
    /// `stronghold_army`; every other cell starts empty. All cells start
    /// unowned. The match starts at tick 0, running.
    pub fn new<R: Rng + ?Sized>(
        terrain: TerrainGrid,
        stronghold_army: std::ops::RangeInclusive<u32>,
        rng: &mut R,
    ) -> Self {
        let cells = terrain
            .iter()
            .map(|(_, t)| {
                let army = match t {
                    Terrain::Stronghold => rng.random_range(stronghold_army.clone()),
                    Terrain::Open | Terrain::Obstacle => 0,
                };
                Cell::new(t, army)
            })
            .collect();
        Self {
            terrain,
            cells,
            tick: TickId(0),
            running: true,
        }
    }

    /// The static terrain layer.
    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.terrain.width()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.terrain.height()
    }

    /// Current tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Whether the match is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the match. Irreversible.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// The cell at `coord`, if on the grid.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.terrain.index(coord).map(|i| &self.cells[i])
    }

    /// Mutable access to the cell at `coord`, if on the grid.
    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        self.terrain.index(coord).map(move |i| &mut self.cells[i])
    }

    /// Every cell with its coordinate, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (self.terrain.coord(i), c))
    }

    /// Mutable access to two distinct cells at once.
    ///
    /// Returns `None` if either coordinate is off-grid or both are the same.
    pub fn cell_pair_mut(&mut self, a: CellCoord, b: CellCoord) -> Option<(&mut Cell, &mut Cell)> {
        let ia = self.terrain.index(a)?;
        let ib = self.terrain.index(b)?;
        match ia.cmp(&ib) {
            std::cmp::Ordering::Less => {
                let (lo, hi) = self.cells.split_at_mut(ib);
                Some((&mut lo[ia], &mut hi[0]))
            }
            std::cmp::Ordering::Greater => {
                let (lo, hi) = self.cells.split_at_mut(ia);
                Some((&mut hi[0], &mut lo[ib]))
            }
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The home cell of `player`, if they have one.
    pub fn home_of(&self, player: &PlayerId) -> Option<CellCoord> {
        self.cells()
            .find(|(_, c)| c.is_home && c.is_owned_by(player))
            .map(|(coord, _)| coord)
    }

    /// Open, unowned cells a new player may spawn on, row-major.
    pub fn spawn_candidates(&self) -> Vec<CellCoord> {
        self.cells()
            .filter(|(_, c)| c.terrain == Terrain::Open && c.owner.is_none())
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Clear the moved flag on every cell.
    pub fn reset_moved(&mut self) {
        for cell in &mut self.cells {
            cell.moved_this_tick = false;
        }
    }

    /// Advance the tick counter by one and return the new tick.
    pub fn advance_tick(&mut self) -> TickId {
        self.tick = self.tick.next();
        self.tick
    }

    /// Apply growth for the current tick.
    ///
    /// Owned homes and strongholds gain one unit. If the current tick is a
    /// multiple of `bonus_interval`, every owned cell gains one more.
    pub fn apply_growth(&mut self, bonus_interval: u64) -> GrowthReport {
        let bonus = bonus_interval > 0 && self.tick.0 % bonus_interval == 0;
        let mut report = GrowthReport::default();
        for cell in self.cells.iter_mut().filter(|c| c.owner.is_some()) {
            if cell.is_growth_cell() {
                cell.army = cell.army.saturating_add(1);
                report.grown_cells += 1;
            }
            if bonus {
                cell.army = cell.army.saturating_add(1);
                report.bonus_cells += 1;
            }
        }
        report
    }

    /// Immutable copy of the public state.
    pub fn snapshot(&self) -> StateSnapshot {
        let cells = self
            .cells
            .chunks(self.width())
            .map(|row| row.iter().map(CellView::from).collect())
            .collect();
        StateSnapshot {
            tick: self.tick,
            width: self.width(),
            height: self.height(),
            cells,
        }
    }
}
