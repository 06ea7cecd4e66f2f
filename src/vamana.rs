//! Vamana graph construction.
//!
//! Vamana (from DiskANN) builds a navigable directed graph with bounded
//! out-degree in a single pass over a random permutation of the points.
//!
//! # Key Parameters
//!
//! - `max_degree` (R): Maximum neighbors per node
//! - `search_list_size` (L): Frontier bound of the greedy search during construction
//! - `alpha`: Pruning slack used when back-edges overflow a neighbor's degree
//!
//! # Algorithm
//!
//! 1. Initialize a random R-regular graph and find the medoid `s`.
//! 2. Draw a permutation σ of all node ids.
//! 3. For each `i` in σ order:
//!    - greedy search from `s` toward point `i` with frontier bound L
//!    - RobustPrune(i, visited, alpha = 1.0, R) sets i's out-neighbors
//!    - for every new out-neighbor `j`: append `j -> i` if `j` has room,
//!      otherwise RobustPrune(j, N(j) ∪ {i}, alpha, R)
//!
//! Each prune writes exactly one node's adjacency list, and every write is
//! visible to the searches of later points in the same pass. The pass is
//! therefore order dependent: the graph is a function of the data, the
//! parameters and the seed.
//!
//! # Degree bound
//!
//! Every node leaves a prune with at most R edges, and a back-edge is only
//! appended when it keeps the target at or below R. Nodes that only ever
//! received appended back-edges are not re-pruned, so diversity (not degree)
//! is the property that holds only eventually.
//!
//! # References
//!
//! - Subramanya et al. (2019): "DiskANN: Fast Accurate Billion-point Nearest
//!   Neighbor Search on a Single Node"

use crate::dataset::Dataset;
use crate::error::{Result, VamanaError};
use crate::graph::{Edge, Graph};
use crate::init::random_graph;
use crate::medoid::{find_medoid, MedoidStrategy};
use crate::monitor::{BuildMonitor, NoMonitor};
use crate::prune::{check_alpha, robust_prune};
use crate::search::{greedy_search, SearchParams};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Instant;

/// Configuration for Vamana graph construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VamanaParams {
    /// Maximum degree (R) - neighbors per node
    pub max_degree: usize,
    /// Build search list size (L) - frontier bound during construction
    pub search_list_size: usize,
    /// Alpha for back-edge pruning (>= 1.0)
    pub alpha: f32,
    /// How the entry point is chosen
    pub medoid: MedoidStrategy,
    /// Seed for the initial graph and the insertion permutation
    pub seed: u64,
    /// Safety cap on nodes expanded per greedy search
    pub max_visits: Option<usize>,
}

impl Default for VamanaParams {
    fn default() -> Self {
        Self {
            max_degree: 64,
            search_list_size: 128,
            alpha: 1.0,
            medoid: MedoidStrategy::Exact,
            seed: 42,
            max_visits: None,
        }
    }
}

impl VamanaParams {
    /// Fast config (lower quality, faster build)
    pub fn fast() -> Self {
        Self {
            max_degree: 32,
            search_list_size: 64,
            ..Self::default()
        }
    }

    /// High quality config
    pub fn high_quality() -> Self {
        Self {
            max_degree: 96,
            search_list_size: 256,
            alpha: 1.2,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_degree == 0 {
            return Err(VamanaError::InvalidInput(
                "max_degree (R) must be greater than 0".into(),
            ));
        }
        if self.search_list_size == 0 {
            return Err(VamanaError::InvalidInput(
                "search_list_size (L) must be greater than 0".into(),
            ));
        }
        check_alpha(self.alpha)?;
        self.medoid.validate()?;
        self.search_params().validate()
    }

    /// Search parameters used while inserting points.
    fn search_params(&self) -> SearchParams {
        SearchParams {
            k: 1,
            l: self.search_list_size,
            max_visits: self.max_visits,
        }
    }
}

/// A built Vamana graph and its entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct VamanaIndex {
    graph: Graph,
    medoid: u32,
}

impl VamanaIndex {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Entry point of every search.
    pub fn medoid(&self) -> u32 {
        self.medoid
    }

    /// k nearest neighbors of `query` by greedy search from the medoid.
    ///
    /// `data` must be the dataset the graph was built from.
    pub fn search(
        &self,
        data: &Dataset,
        query: &[f32],
        k: usize,
        l: usize,
    ) -> Result<Vec<(u32, f32)>> {
        let params = SearchParams::new(k, l);
        let outcome = greedy_search(&self.graph, data, query, self.medoid, &params)?;
        Ok(outcome.results)
    }
}

/// Build a Vamana graph over `data`.
pub fn build_vamana(data: &Dataset, params: &VamanaParams) -> Result<VamanaIndex> {
    build_vamana_with_monitor(data, params, &NoMonitor)
}

/// Build a Vamana graph, reporting progress after every inserted point.
pub fn build_vamana_with_monitor<M: BuildMonitor + ?Sized>(
    data: &Dataset,
    params: &VamanaParams,
    monitor: &M,
) -> Result<VamanaIndex> {
    params.validate()?;
    if data.is_empty() {
        return Err(VamanaError::InvalidInput("dataset is empty".into()));
    }

    let started = Instant::now();
    tracing::info!(
        n = data.len(),
        dimension = data.dimension(),
        r = params.max_degree,
        l = params.search_list_size,
        alpha = params.alpha,
        "building vamana graph"
    );

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut graph = random_graph(data, params.max_degree, &mut rng)?;
    let medoid = find_medoid(data, &params.medoid)?;
    let sigma = random_permutation(data.len(), &mut rng);

    insertion_pass(&mut graph, data, medoid, &sigma, params, monitor)?;

    tracing::info!(
        medoid,
        edges = graph.edge_count(),
        max_degree = graph.max_out_degree(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "vamana graph built"
    );

    Ok(VamanaIndex { graph, medoid })
}

/// Random permutation of `0..n` (Fisher-Yates via `SliceRandom::shuffle`).
pub fn random_permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<u32> {
    let mut order: Vec<u32> = (0..n as u32).collect();
    order.shuffle(rng);
    order
}

/// One pass of search-and-prune over `sigma`, mutating `graph` in place.
fn insertion_pass<M: BuildMonitor + ?Sized>(
    graph: &mut Graph,
    data: &Dataset,
    medoid: u32,
    sigma: &[u32],
    params: &VamanaParams,
    monitor: &M,
) -> Result<()> {
    let search = params.search_params();
    let r = params.max_degree;
    let total = sigma.len();

    for (done, &i) in sigma.iter().enumerate() {
        let outcome = greedy_search(graph, data, data.point(i), medoid, &search)?;
        robust_prune(
            graph,
            data,
            i,
            outcome.visited.iter().map(|&(id, _)| id),
            1.0,
            r,
        )?;

        let out: SmallVec<[u32; 32]> = graph.neighbor_ids(i).collect();
        for j in out {
            if graph.has_edge(j, i) {
                continue;
            }
            if graph.out_degree(j) + 1 > r {
                robust_prune(graph, data, j, [i], params.alpha, r)?;
            } else {
                graph.push_edge(j, Edge::new(i, data.distance(j, i)));
            }
        }

        tracing::trace!(node = i, visited = outcome.visited.len(), "inserted");
        if monitor.on_point(done + 1, total).is_break() {
            return Err(VamanaError::Cancelled {
                processed: done + 1,
                total,
            });
        }
    }

    Ok(())
}
