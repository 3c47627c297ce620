//! tilewar: a tick-synchronized territorial-conquest engine.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all tilewar sub-crates. For most users, adding `tilewar` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tilewar::prelude::*;
//!
//! let grid = TerrainGrid::parse("0000\n0120\n0000").unwrap();
//! let mut game = LockstepMatch::new(grid, MatchConfig::default()).unwrap();
//!
//! let alice = PlayerId::new("alice");
//! let home = game.join(&alice).unwrap().home;
//! game.step().unwrap();
//!
//! let snapshot = game.snapshot();
//! assert_eq!(snapshot.tick, TickId(1));
//! assert_eq!(snapshot.cell(home).unwrap().army, 2);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tilewar-core` | IDs, cells, commands, outcomes, wire types, errors |
//! | [`space`] | `tilewar-space` | Terrain grids, map files, map generation |
//! | [`engine`] | `tilewar-engine` | Tick engine and match drivers (lockstep and realtime) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`tilewar-core`).
///
/// Contains cells, terrain, move commands and their outcomes, the JSON
/// wire types ([`types::MoveRequest`], [`types::StateSnapshot`]), and the
/// error enums.
pub use tilewar_core as types;

/// Terrain grids and map sources (`tilewar-space`).
///
/// [`space::TerrainGrid`] parses map text; [`space::MapGenerator`] and the
/// map-file helpers produce and load `.map` files.
pub use tilewar_space as space;

/// Match engines (`tilewar-engine`).
///
/// [`engine::LockstepMatch`] for caller-driven stepping,
/// [`engine::RealtimeMatch`] for a background tick thread.
pub use tilewar_engine as engine;

/// Common imports for typical tilewar usage.
///
/// ```rust
/// use tilewar::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tilewar_core::{
        Cell, CellCoord, CellView, Direction, MoveCommand, MoveEffect, MoveOutcome, PlayerId,
        Resolution, SpawnResult, StateSnapshot, Terrain, TickId,
    };

    // Wire requests
    pub use tilewar_core::{JoinRequest, MoveRequest};

    // Errors
    pub use tilewar_core::{InvalidJoinRequest, InvalidMoveRequest, JoinError, MapLoadError};

    // Space
    pub use tilewar_space::{MapGenerator, TerrainGrid};

    // Engine
    pub use tilewar_engine::{
        Broadcast, BroadcastError, ChannelBroadcast, ConfigError, LockstepMatch, MatchConfig,
        RealtimeMatch, SubmitError, TickEngine, TickError, TickMetrics, TickResult,
    };
}
