//! Match engine for tilewar.
//!
//! Owns the mutable match state and runs the per-tick pipeline: buffered
//! move resolution, growth, and snapshot emission. Supports both lockstep
//! (caller-driven) and realtime (background tick thread) modes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod egress;
pub mod invariants;
pub mod join;
pub mod lockstep;
pub mod metrics;
pub mod realtime;
pub mod resolve;
pub mod state;
pub mod tick;
pub(crate) mod tick_thread;

pub use buffer::CommandBuffer;
pub use config::{ConfigError, MatchConfig};
pub use egress::{Broadcast, BroadcastError, ChannelBroadcast, NullBroadcast};
pub use invariants::{check_invariants, check_moved_flags_clear, InvariantViolation};
pub use join::join_player;
pub use lockstep::LockstepMatch;
pub use metrics::TickMetrics;
pub use realtime::{RealtimeMatch, SubmitError};
pub use resolve::resolve_move;
pub use state::{GrowthReport, MatchState};
pub use tick::{TickEngine, TickError, TickResult};
