//! Error taxonomy for the line-status engine.

use crate::range::Range;
use thiserror::Error;

/// Errors surfaced by the diff engine, the tracker, and the rollback paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// An input exceeded the configured [`DiffLimits`](crate::DiffLimits) ceiling, or the edit
    /// distance blew past the quadratic-blowup guard. The tracker recovers by degrading to
    /// shift-only tracking; callers of the diff engine decide their own fallback.
    #[error("input too large for exact diff ({lines} lines, {bytes} bytes)")]
    DiffTooLarge {
        /// Line count of the offending input.
        lines: usize,
        /// Byte size of the offending input.
        bytes: usize,
    },

    /// A rollback was requested for a range value that no longer matches any tracked range
    /// (the buffer changed between query and rollback). The caller must re-query.
    #[error("range {0:?} is not present in the tracked range list")]
    StaleRange(Range),

    /// The repeated-rollback safety cap tripped. This indicates a defect in the splice/merge
    /// bookkeeping, never a normal runtime condition.
    #[error("rollback failed to converge after {iterations} iterations")]
    RevertLoop {
        /// Number of rollback iterations performed before aborting.
        iterations: usize,
    },
}
