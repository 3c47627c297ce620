//! Core types for the tilewar territorial-conquest engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared across the workspace: identifiers, terrain and
//! cell records, move commands and their outcomes, transport-facing
//! request/snapshot types, and error enums.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod command;
pub mod error;
pub mod id;
pub mod wire;

pub use cell::{Cell, Terrain};
pub use command::{
    Direction, MoveCommand, MoveEffect, MoveOutcome, MoveRejection, Resolution, SpawnResult,
};
pub use error::{InvalidJoinRequest, InvalidMoveRequest, JoinError, MapLoadError};
pub use id::{CellCoord, PlayerId, TickId};
pub use wire::{CellView, JoinRequest, MoveRequest, Standing, StateSnapshot};
