//! Immutable terrain grid with 4-connected (up/left/down/right) stepping.

use smallvec::SmallVec;
use tilewar_core::{CellCoord, Direction, MapLoadError, Terrain};

/// A rectangular grid of terrain, fixed for the lifetime of a match.
///
/// Each cell has coordinate `(row, col)` where `0 <= row < height` and
/// `0 <= col < width`. Stepping off the grid yields `None`: there is no
/// wrapping or clamping at the edges.
///
/// # Examples
///
/// ```
/// use tilewar_core::{CellCoord, Direction, Terrain};
/// use tilewar_space::TerrainGrid;
///
/// let grid = TerrainGrid::parse("010\n002\n").unwrap();
/// assert_eq!((grid.width(), grid.height()), (3, 2));
/// assert_eq!(grid.terrain(CellCoord::new(1, 2)), Some(Terrain::Stronghold));
/// assert_eq!(grid.step(CellCoord::new(0, 0), Direction::Up), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    cells: Vec<Terrain>,
}

impl TerrainGrid {
    /// Build a grid from rows of terrain.
    ///
    /// Returns `MapLoadError::Empty` if there are no rows or the rows are
    /// empty, and `MapLoadError::RaggedRows` if any row's length differs
    /// from the first.
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> Result<Self, MapLoadError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(MapLoadError::Empty);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(MapLoadError::RaggedRows {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Parse map text: one row per line, one terrain code per character.
    ///
    /// Whitespace around each line is trimmed and blank lines at the
    /// start or end of the text are ignored. Codes are `0` (open), `1`
    /// (obstacle) and `2` or `3` (stronghold).
    pub fn parse(text: &str) -> Result<Self, MapLoadError> {
        let rows = text
            .trim()
            .lines()
            .enumerate()
            .map(|(row, line)| {
                line.trim()
                    .chars()
                    .enumerate()
                    .map(|(col, code)| {
                        Terrain::from_code(code)
                            .ok_or(MapLoadError::UnknownTerrain { row, col, code })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    /// Render back to map text, one line per row, with a trailing newline.
    pub fn to_map_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width) {
            out.extend(row.iter().map(|t| t.code()));
            out.push('\n');
        }
        out
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `coord` lies on the grid.
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Row-major index of `coord`, if on the grid.
    pub fn index(&self, coord: CellCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.row * self.width + coord.col)
    }

    /// Coordinate of a row-major index.
    pub fn coord(&self, index: usize) -> CellCoord {
        CellCoord::new(index / self.width, index % self.width)
    }

    /// Terrain at `coord`, if on the grid.
    pub fn terrain(&self, coord: CellCoord) -> Option<Terrain> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Terrain of every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Terrain)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, t)| (self.coord(i), *t))
    }

    /// The cell one step from `from` in `direction`, or `None` off-grid.
    pub fn step(&self, from: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (dr, dc) = direction.offset();
        let row = from.row.checked_add_signed(dr)?;
        let col = from.col.checked_add_signed(dc)?;
        let to = CellCoord::new(row, col);
        self.contains(to).then_some(to)
    }

    /// On-grid, passable neighbours of `from`, in [`Direction::ALL`] order.
    pub fn passable_neighbours(&self, from: CellCoord) -> SmallVec<[(Direction, CellCoord); 4]> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| {
                let to = self.step(from, d)?;
                self.terrain(to)
                    .filter(|t| t.is_passable())
                    .map(|_| (d, to))
            })
            .collect()
    }

    /// Number of cells of the given terrain.
    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|t| **t == terrain).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(row: usize, col: usize) -> CellCoord {
        CellCoord::new(row, col)
    }

    #[test]
    fn parse_reads_rows_and_codes() {
        let grid = TerrainGrid::parse("0123\n0000\n").unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.terrain(c(0, 1)), Some(Terrain::Obstacle));
        assert_eq!(grid.terrain(c(0, 2)), Some(Terrain::Stronghold));
        assert_eq!(grid.terrain(c(0, 3)), Some(Terrain::Stronghold));
        assert_eq!(grid.count(Terrain::Open), 5);
    }

    #[test]
    fn parse_trims_whitespace_and_blank_edges() {
        let grid = TerrainGrid::parse("\n  01 \r\n10\n\n").unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 2));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(TerrainGrid::parse(""), Err(MapLoadError::Empty)));
        assert!(matches!(TerrainGrid::parse("\n\n"), Err(MapLoadError::Empty)));
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let err = TerrainGrid::parse("000\n00\n").unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::RaggedRows {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn parse_rejects_unknown_code() {
        let err = TerrainGrid::parse("00\n0x\n").unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::UnknownTerrain {
                row: 1,
                col: 1,
                code: 'x'
            }
        ));
    }

    #[test]
    fn step_stays_on_grid() {
        let grid = TerrainGrid::parse("000\n000\n000").unwrap();
        assert_eq!(grid.step(c(1, 1), Direction::Up), Some(c(0, 1)));
        assert_eq!(grid.step(c(1, 1), Direction::Left), Some(c(1, 0)));
        assert_eq!(grid.step(c(1, 1), Direction::Down), Some(c(2, 1)));
        assert_eq!(grid.step(c(1, 1), Direction::Right), Some(c(1, 2)));
        assert_eq!(grid.step(c(0, 0), Direction::Up), None);
        assert_eq!(grid.step(c(0, 0), Direction::Left), None);
        assert_eq!(grid.step(c(2, 2), Direction::Down), None);
        assert_eq!(grid.step(c(2, 2), Direction::Right), None);
    }

    #[test]
    fn passable_neighbours_skip_obstacles_and_edges() {
        let grid = TerrainGrid::parse("010\n000").unwrap();
        let n = grid.passable_neighbours(c(0, 0));
        assert_eq!(n.as_slice(), &[(Direction::Down, c(1, 0))]);
        assert_eq!(grid.passable_neighbours(c(1, 1)).len(), 2);
    }

    #[test]
    fn map_text_is_canonical() {
        let grid = TerrainGrid::parse("013\n200").unwrap();
        assert_eq!(grid.to_map_text(), "012\n200\n");
    }

    proptest! {
        #[test]
        fn index_and_coord_agree(w in 1usize..20, h in 1usize..20, seed in 0usize..400) {
            let grid = TerrainGrid::from_rows(vec![vec![Terrain::Open; w]; h]).unwrap();
            let i = seed % grid.cell_count();
            let coord = grid.coord(i);
            prop_assert!(grid.contains(coord));
            prop_assert_eq!(grid.index(coord), Some(i));
        }
    }
}
