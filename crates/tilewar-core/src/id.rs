//! Strongly-typed identifiers: [`PlayerId`], [`TickId`], and [`CellCoord`].

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifies a player within a match.
///
/// Players are identified by the name they joined with. The name is
/// stored behind an `Arc<str>` so that ownership can be stamped onto
/// many cells without reallocating the string each time.
///
/// # Examples
///
/// ```
/// use tilewar_core::PlayerId;
///
/// let a = PlayerId::new("alice");
/// let b: PlayerId = "alice".into();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "alice");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Arc<str>);

impl PlayerId {
    /// Create a player id from any string-like value.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The player's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

impl From<String> for PlayerId {
    fn from(v: String) -> Self {
        Self(Arc::from(v))
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one step. A freshly
/// created match sits at `TickId(0)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A `(row, col)` cell address on the match grid.
///
/// Rows grow downward and columns grow to the right, so "up" decreases
/// the row. Ordering is row-major, which is the canonical iteration
/// order of the grid.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    /// Row index, `0` is the top row.
    pub row: usize,
    /// Column index, `0` is the leftmost column.
    pub col: usize,
}

impl CellCoord {
    /// Build a coordinate from a row and a column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for CellCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}
