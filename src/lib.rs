//! stitched-vamana: Vamana proximity graphs for approximate nearest neighbor search.
//!
//! Builds a directed graph with bounded out-degree over a fixed point set so
//! that greedy, distance-descending traversal reaches near neighbors in
//! sub-linear time. Two builders are provided:
//!
//! - [`vamana`]: the single-pass DiskANN construction (random init, medoid,
//!   greedy search, robust pruning with back-edge repair)
//! - [`stitched`]: one small Vamana graph per label, merged by global id and
//!   re-pruned to a global degree bound (Filtered-DiskANN's StitchedVamana)
//!
//! The building blocks are public on their own: [`init`], [`medoid`],
//! [`search`] and [`prune`].
//!
//! # Usage
//!
//! ```rust
//! use stitched_vamana::{build_vamana, Dataset, VamanaParams};
//!
//! # fn main() -> Result<(), stitched_vamana::VamanaError> {
//! let rows: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32, (i % 7) as f32]).collect();
//! let data = Dataset::from_rows(&rows)?;
//!
//! let params = VamanaParams {
//!     max_degree: 8,
//!     search_list_size: 16,
//!     ..Default::default()
//! };
//! let index = build_vamana(&data, &params)?;
//!
//! let results = index.search(&data, &[42.0, 0.0], 5, 16)?;
//! assert_eq!(results.len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! # Determinism
//!
//! Every random choice (initial graph, insertion order, sampled medoid) is
//! driven by an explicit seed. The same data, parameters and seed always
//! produce the same graph.
//!
//! # Concurrency
//!
//! Builds are single-threaded. Each prune rewrites exactly one node's
//! adjacency list through [`prune::select_neighbors`] (read-only) followed by
//! a single write, so the write set of every step is one node.

pub mod dataset;
pub mod distance;
pub mod error;
pub mod graph;
pub mod init;
pub mod medoid;
pub mod monitor;
pub mod prune;
pub mod search;
pub mod stitched;
pub mod vamana;

// Re-exports
pub use dataset::{Dataset, LabelPartition};
pub use error::{Result, VamanaError};
pub use graph::{Edge, Graph, GraphStats};
pub use medoid::MedoidStrategy;
pub use monitor::{BuildMonitor, FnMonitor, NoMonitor};
pub use search::{
    multi_start_search, FilterPredicate, FnFilter, NoFilter, SearchOutcome, SearchParams,
};
pub use stitched::{build_stitched, build_stitched_with_monitor, StitchedIndex, StitchedParams};
pub use vamana::{build_vamana, build_vamana_with_monitor, VamanaIndex, VamanaParams};
