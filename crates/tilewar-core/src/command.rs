//! Move commands, directions, and the outcome types returned to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidMoveRequest;
use crate::id::{CellCoord, PlayerId};

/// One of the four cardinal move directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards column 0.
    Left,
    /// Towards the last row.
    Down,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// All directions in a fixed order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Unit vector `(d_row, d_col)` for this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Left => (0, -1),
            Self::Down => (1, 0),
            Self::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Left => write!(f, "left"),
            Self::Down => write!(f, "down"),
            Self::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Direction {
    type Err = InvalidMoveRequest;

    /// Parses `up`/`left`/`down`/`right` (any case) and the keyboard
    /// aliases `w`/`a`/`s`/`d`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Self::Up),
            "left" | "a" => Ok(Self::Left),
            "down" | "s" => Ok(Self::Down),
            "right" | "d" => Ok(Self::Right),
            _ => Err(InvalidMoveRequest::UnknownDirection {
                direction: s.to_string(),
            }),
        }
    }
}

/// A validated move command: move everything but one unit from `origin`
/// one cell in `direction`.
///
/// # Examples
///
/// ```
/// use tilewar_core::{CellCoord, Direction, MoveCommand, PlayerId};
///
/// let cmd = MoveCommand::new("alice", CellCoord::new(1, 1), Direction::Up);
/// assert_eq!(cmd.player, PlayerId::new("alice"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCommand {
    /// The issuing player.
    pub player: PlayerId,
    /// The cell the army leaves from.
    pub origin: CellCoord,
    /// The direction of travel.
    pub direction: Direction,
}

impl MoveCommand {
    /// Build a command.
    pub fn new(player: impl Into<PlayerId>, origin: CellCoord, direction: Direction) -> Self {
        Self {
            player: player.into(),
            origin,
            direction,
        }
    }
}

/// Why a move was not applied.
///
/// Rejections are ordinary gameplay outcomes, not errors: transport
/// callers drop them silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRejection {
    /// The origin lies outside the grid.
    OriginOutOfBounds,
    /// The origin is not owned by the issuing player.
    NotOwner,
    /// The origin holds one unit or fewer; one unit must stay behind.
    InsufficientArmy,
    /// The target lies outside the grid.
    TargetOutOfBounds,
    /// The target is an obstacle.
    Obstacle,
    /// The target belongs to another player.
    ///
    /// Unlike every other rejection this one is *not* side-effect free:
    /// the moving army has already left the origin and is lost. There is
    /// no combat against enemy-held cells.
    EnemyTerritory,
    /// The match has stopped; nothing resolves or buffers any more.
    MatchStopped,
}

impl MoveRejection {
    /// Whether the origin's army was consumed despite the rejection.
    pub fn consumed_army(self) -> bool {
        matches!(self, Self::EnemyTerritory)
    }
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OriginOutOfBounds => write!(f, "origin out of bounds"),
            Self::NotOwner => write!(f, "origin not owned by player"),
            Self::InsufficientArmy => write!(f, "origin army too small to move"),
            Self::TargetOutOfBounds => write!(f, "target out of bounds"),
            Self::Obstacle => write!(f, "target is an obstacle"),
            Self::EnemyTerritory => write!(f, "target held by another player"),
            Self::MatchStopped => write!(f, "match stopped"),
        }
    }
}

/// What an applied move did to its target cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveEffect {
    /// An unowned cell was claimed.
    Claimed {
        /// Units now stationed on the target.
        army: u32,
    },
    /// Units were added to one of the player's own cells.
    Reinforced {
        /// Units now stationed on the target.
        army: u32,
    },
    /// An unclaimed stronghold fell to the attacker.
    StrongholdCaptured {
        /// Surviving attackers now garrisoning the stronghold.
        army: u32,
    },
    /// An unclaimed stronghold held; its garrison was reduced.
    StrongholdHeld {
        /// Garrison left on the stronghold.
        army: u32,
    },
}

/// Result of resolving one move against the match state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The move was applied.
    Applied(MoveEffect),
    /// The move was rejected.
    Rejected(MoveRejection),
}

impl Resolution {
    /// Whether the move was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Result of submitting a move to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was resolved immediately.
    Resolved(Resolution),
    /// The origin already moved this tick; the move is pending for the
    /// next tick boundary. `replaced` is true if it overwrote an earlier
    /// pending move for the same origin.
    Buffered {
        /// Whether an earlier pending command was superseded.
        replaced: bool,
    },
    /// The move was rejected before reaching the resolver or buffer.
    Rejected(MoveRejection),
}

impl MoveOutcome {
    /// Whether the move took effect immediately.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Resolved(r) if r.is_applied())
    }
}

/// Result of a successful join.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnResult {
    /// The player's home cell.
    pub home: CellCoord,
    /// False if the player already had a home and nothing changed.
    pub newly_spawned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_names_and_keys() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("LEFT".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("s".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!("d".parse::<Direction>().unwrap(), Direction::Right);
        assert!(matches!(
            "north".parse::<Direction>(),
            Err(InvalidMoveRequest::UnknownDirection { .. })
        ));
    }

    #[test]
    fn offsets_are_unit_vectors() {
        for d in Direction::ALL {
            let (dr, dc) = d.offset();
            assert_eq!(dr.abs() + dc.abs(), 1, "{d}");
        }
        assert_eq!(Direction::Up.offset(), (-1, 0));
    }

    #[test]
    fn only_enemy_rejection_consumes_army() {
        assert!(MoveRejection::EnemyTerritory.consumed_army());
        assert!(!MoveRejection::Obstacle.consumed_army());
        assert!(!MoveRejection::InsufficientArmy.consumed_army());
        assert!(!MoveRejection::MatchStopped.consumed_army());
    }

    #[test]
    fn outcome_applied_only_when_resolved_and_applied() {
        let applied = MoveOutcome::Resolved(Resolution::Applied(MoveEffect::Claimed { army: 1 }));
        assert!(applied.is_applied());
        assert!(!MoveOutcome::Buffered { replaced: false }.is_applied());
        assert!(!MoveOutcome::Resolved(Resolution::Rejected(MoveRejection::NotOwner)).is_applied());
    }
}
