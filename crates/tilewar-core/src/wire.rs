//! Transport-facing request and snapshot types.
//!
//! These are what the transport layer deserializes from clients and
//! serializes back out. Requests are deliberately permissive (every field
//! optional) so that malformed input surfaces as a validation error
//! instead of a decode failure.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Terrain};
use crate::command::MoveCommand;
use crate::error::{InvalidJoinRequest, InvalidMoveRequest};
use crate::id::{CellCoord, PlayerId, TickId};

/// A client's request to join the match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinRequest {
    /// Player name.
    pub player: Option<String>,
    /// Room name. Routing metadata for the transport; the engine ignores it.
    pub room: Option<String>,
}

impl JoinRequest {
    /// Check that both fields are present and return the player id.
    pub fn validate(&self) -> Result<PlayerId, InvalidJoinRequest> {
        let player = non_empty(&self.player).ok_or(InvalidJoinRequest::MissingPlayer)?;
        non_empty(&self.room).ok_or(InvalidJoinRequest::MissingRoom)?;
        Ok(PlayerId::new(player))
    }
}

/// A client's request to move an army.
///
/// # Examples
///
/// ```
/// use tilewar_core::{CellCoord, Direction, MoveRequest};
///
/// let req: MoveRequest =
///     serde_json::from_str(r#"{"player":"A","from":[1,2],"direction":"up"}"#).unwrap();
/// let cmd = req.validate().unwrap();
/// assert_eq!(cmd.origin, CellCoord::new(1, 2));
/// assert_eq!(cmd.direction, Direction::Up);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveRequest {
    /// Player name.
    pub player: Option<String>,
    /// Origin cell as `[row, col]`.
    pub from: Option<[i64; 2]>,
    /// Direction name or key alias.
    pub direction: Option<String>,
}

impl MoveRequest {
    /// Validate the request into a [`MoveCommand`].
    ///
    /// Only the shape of the request is checked here; whether the origin
    /// lies on the grid is decided by the engine.
    pub fn validate(&self) -> Result<MoveCommand, InvalidMoveRequest> {
        let player = non_empty(&self.player).ok_or(InvalidMoveRequest::MissingPlayer)?;
        let [row, col] = self.from.ok_or(InvalidMoveRequest::MissingOrigin)?;
        let direction = self
            .direction
            .as_deref()
            .ok_or(InvalidMoveRequest::MissingDirection)?
            .parse()?;
        let (Ok(r), Ok(c)) = (usize::try_from(row), usize::try_from(col)) else {
            return Err(InvalidMoveRequest::NegativeCoordinate { row, col });
        };
        Ok(MoveCommand::new(player, CellCoord::new(r, c), direction))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Public view of one cell. Omits the per-tick moved flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Terrain type.
    #[serde(rename = "type")]
    pub terrain: Terrain,
    /// Owning player, if any.
    pub owner: Option<PlayerId>,
    /// Army strength.
    pub army: u32,
    /// Whether this is the owner's spawn cell.
    #[serde(rename = "isHome")]
    pub is_home: bool,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            terrain: cell.terrain,
            owner: cell.owner.clone(),
            army: cell.army,
            is_home: cell.is_home,
        }
    }
}

/// Full copy of the match state, broadcast once per tick and after
/// every successful join. Clients replace their local state wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Tick at which the snapshot was taken.
    pub tick: TickId,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Cells indexed `[row][col]`.
    pub cells: Vec<Vec<CellView>>,
}

/// Per-player aggregate derived from a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Number of cells owned.
    pub cells: usize,
    /// Total army over all owned cells.
    pub army: u64,
    /// Number of strongholds owned.
    pub strongholds: usize,
    /// Whether the player still holds their home.
    pub has_home: bool,
}

impl StateSnapshot {
    /// The cell at `coord`, if on the grid.
    pub fn cell(&self, coord: CellCoord) -> Option<&CellView> {
        self.cells.get(coord.row)?.get(coord.col)
    }

    /// Serialize to the JSON broadcast payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Per-player standings, in row-major order of first appearance.
    pub fn standings(&self) -> IndexMap<PlayerId, Standing> {
        let mut out: IndexMap<PlayerId, Standing> = IndexMap::new();
        for cell in self.cells.iter().flatten() {
            let Some(owner) = &cell.owner else {
                continue;
            };
            let entry = out.entry(owner.clone()).or_default();
            entry.cells += 1;
            entry.army += u64::from(cell.army);
            if cell.terrain == Terrain::Stronghold {
                entry.strongholds += 1;
            }
            entry.has_home |= cell.is_home;
        }
        out
    }
}
