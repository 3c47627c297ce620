//! Random map generation.
//!
//! Each cell is drawn independently: a stronghold with probability
//! `stronghold_ratio`, otherwise an obstacle with probability
//! `obstacle_ratio`, otherwise open land.

use rand::Rng;
use tilewar_core::{MapLoadError, Terrain};

use crate::grid::TerrainGrid;

/// Parameters for [`MapGenerator::generate`].
#[derive(Clone, Debug)]
pub struct MapGenerator {
    /// Number of columns. Default: 30.
    pub width: usize,
    /// Number of rows. Default: 30.
    pub height: usize,
    /// Fraction of cells that are strongholds. Default: 0.05.
    pub stronghold_ratio: f64,
    /// Fraction of cells that are obstacles. Default: 0.20.
    pub obstacle_ratio: f64,
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            stronghold_ratio: 0.05,
            obstacle_ratio: 0.20,
        }
    }
}

impl MapGenerator {
    /// Generator for a `width` x `height` map with default ratios.
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Generate a grid. Fails with `MapLoadError::Empty` for a zero dimension.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TerrainGrid, MapLoadError> {
        let stronghold = self.stronghold_ratio;
        let obstacle = stronghold + self.obstacle_ratio;
        let rows = (0..self.height)
            .map(|_| {
                (0..self.width)
                    .map(|_| {
                        let r: f64 = rng.random();
                        if r < stronghold {
                            Terrain::Stronghold
                        } else if r < obstacle {
                            Terrain::Obstacle
                        } else {
                            Terrain::Open
                        }
                    })
                    .collect()
            })
            .collect();
        TerrainGrid::from_rows(rows)
    }
}
