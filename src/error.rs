//! Error types for graph construction.

use thiserror::Error;

/// Errors that can abort a graph build.
///
/// Builds are pure batch computations: any error invalidates the whole build
/// and the caller restarts from scratch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VamanaError {
    /// Malformed dataset or parameter value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A point or query has the wrong number of coordinates.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The graph is not in a state the operation can work with
    /// (e.g. a start node outside the graph).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Greedy search hit its visitation cap before converging.
    #[error("search visited {visited} nodes, exceeding the limit of {limit}")]
    ResourceExhausted { visited: usize, limit: usize },

    /// A [`BuildMonitor`](crate::monitor::BuildMonitor) asked the build to stop.
    #[error("build cancelled after {processed} of {total} steps")]
    Cancelled { processed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, VamanaError>;
