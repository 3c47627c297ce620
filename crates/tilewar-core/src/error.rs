//! Error types for the tilewar engine, organized by subsystem:
//! map loading, joining, and request validation.
//!
//! Gameplay outcomes (a blocked move, a failed stronghold assault) are
//! not errors; see [`MoveRejection`](crate::command::MoveRejection).

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors producing a terrain grid. Fatal at match start.
#[derive(Debug)]
pub enum MapLoadError {
    /// The terrain source contained no rows.
    Empty,
    /// A row's length differs from the first row's.
    RaggedRows {
        /// Zero-based index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A character is not a known terrain code.
    UnknownTerrain {
        /// Row of the offending character.
        row: usize,
        /// Column of the offending character.
        col: usize,
        /// The character itself.
        code: char,
    },
    /// A map directory contained no `.map` files.
    NoMapFiles {
        /// The directory that was searched.
        dir: PathBuf,
    },
    /// Reading a map file or directory failed.
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for MapLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "terrain source is empty"),
            Self::RaggedRows {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            Self::UnknownTerrain { row, col, code } => {
                write!(f, "unknown terrain code {code:?} at ({row}, {col})")
            }
            Self::NoMapFiles { dir } => {
                write!(f, "no .map files found in {}", dir.display())
            }
            Self::Io { path, source } => write!(f, "reading {}: {source}", path.display()),
        }
    }
}

impl Error for MapLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from the join handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinError {
    /// No open, unowned cell is left to spawn on. Recoverable: the
    /// caller reports a full map and the match continues.
    NoSpawnAvailable,
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSpawnAvailable => write!(f, "map full: no open cell available to spawn"),
        }
    }
}

impl Error for JoinError {}

/// Malformed move request. Dropped silently by transport callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidMoveRequest {
    /// The player field is missing or empty.
    MissingPlayer,
    /// The origin coordinate is missing.
    MissingOrigin,
    /// The direction is missing.
    MissingDirection,
    /// An origin coordinate is negative.
    NegativeCoordinate {
        /// The offending row.
        row: i64,
        /// The offending column.
        col: i64,
    },
    /// The direction is not one of up/left/down/right (or w/a/s/d).
    UnknownDirection {
        /// The direction string as received.
        direction: String,
    },
}

impl fmt::Display for InvalidMoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPlayer => write!(f, "move request has no player"),
            Self::MissingOrigin => write!(f, "move request has no origin"),
            Self::MissingDirection => write!(f, "move request has no direction"),
            Self::NegativeCoordinate { row, col } => {
                write!(f, "origin ({row}, {col}) has a negative coordinate")
            }
            Self::UnknownDirection { direction } => {
                write!(f, "unknown direction {direction:?}")
            }
        }
    }
}

impl Error for InvalidMoveRequest {}

/// Malformed join request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidJoinRequest {
    /// The player field is missing or empty.
    MissingPlayer,
    /// The room field is missing or empty.
    MissingRoom,
}

impl fmt::Display for InvalidJoinRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPlayer => write!(f, "join request has no player"),
            Self::MissingRoom => write!(f, "join request has no room"),
        }
    }
}

impl Error for InvalidJoinRequest {}
