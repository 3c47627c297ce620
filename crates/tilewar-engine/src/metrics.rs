//! Per-tick metrics for the tick engine.
//!
//! [`TickMetrics`] captures what happened during a single tick so drivers
//! can log summaries and tests can assert on buffered-command handling.

/// Timing and outcome counters collected during a single tick.
///
/// Durations are in microseconds. Fields prefixed `total_` are cumulative
/// over the life of the engine; the rest describe the most recent tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Time spent resolving buffered commands, in microseconds.
    pub command_processing_us: u64,
    /// Buffered commands drained this tick.
    pub buffered_drained: usize,
    /// Buffered commands that were applied.
    pub buffered_applied: usize,
    /// Buffered commands that reached the resolver and were rejected.
    pub buffered_rejected: usize,
    /// Buffered commands dropped because the origin changed hands or had
    /// already moved in the new tick.
    pub buffered_dropped: usize,
    /// Owned homes and strongholds that grew.
    pub grown_cells: usize,
    /// Whether the periodic bonus was applied.
    pub bonus_applied: bool,
    /// Cumulative moves resolved immediately on submission.
    pub total_immediate_moves: u64,
    /// Cumulative moves placed in the buffer.
    pub total_buffered_moves: u64,
    /// Cumulative buffered moves that overwrote an earlier one.
    pub total_replaced_moves: u64,
    /// Cumulative snapshot broadcasts that failed.
    pub total_broadcast_failures: u64,
}
