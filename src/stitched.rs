//! Stitched Vamana: one small Vamana graph per label, merged into one graph.
//!
//! # Algorithm
//!
//! 1. Group node ids by label.
//! 2. Build a Vamana graph over each label's points with `(l_small, r_small)`.
//! 3. Map every sub-graph's local ids back to global ids and union the
//!    outgoing edges of each global node.
//! 4. Re-prune every node whose unioned degree exceeds `r_stitched`.
//!
//! A point carrying several labels collects edges from several sub-graphs,
//! which is what the final prune trims back. The result supports
//! label-scoped greedy search (start at the label's medoid, expand only nodes
//! carrying the label) and global search seeded from the entry point plus
//! every label medoid.
//!
//! # References
//!
//! - Gollapudi et al. (2023): "Filtered-DiskANN: Graph Algorithms for
//!   Approximate Nearest Neighbor Search with Filters"

use crate::dataset::{Dataset, LabelPartition};
use crate::error::{Result, VamanaError};
use crate::graph::{Edge, Graph};
use crate::medoid::{find_medoid, MedoidStrategy};
use crate::monitor::{BuildMonitor, NoMonitor};
use crate::prune::{check_alpha, robust_prune};
use crate::search::{
    filtered_greedy_search, multi_start_search, FnFilter, NoFilter, SearchParams,
};
use crate::vamana::{build_vamana, VamanaParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Configuration for a stitched build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchedParams {
    /// Alpha for back-edge pruning inside sub-graphs and for the final re-prune
    pub alpha: f32,
    /// Search list size (L) of each per-label build
    pub l_small: usize,
    /// Maximum degree (R) of each per-label sub-graph
    pub r_small: usize,
    /// Maximum degree of the stitched graph
    pub r_stitched: usize,
    /// Global entry point; computed with `medoid` when absent
    pub medoid_hint: Option<u32>,
    /// Medoid strategy for the per-label and global entry points
    pub medoid: MedoidStrategy,
    /// Base seed; each label derives its own
    pub seed: u64,
    /// Safety cap on nodes expanded per greedy search
    pub max_visits: Option<usize>,
}

impl Default for StitchedParams {
    fn default() -> Self {
        Self {
            alpha: 1.2,
            l_small: 100,
            r_small: 32,
            r_stitched: 64,
            medoid_hint: None,
            medoid: MedoidStrategy::Exact,
            seed: 42,
            max_visits: None,
        }
    }
}

impl StitchedParams {
    pub fn validate(&self) -> Result<()> {
        if self.r_stitched == 0 {
            return Err(VamanaError::InvalidInput(
                "r_stitched must be greater than 0".into(),
            ));
        }
        check_alpha(self.alpha)?;
        self.label_params(0).validate()
    }

    /// Parameters of the sub-graph build for `label`.
    fn label_params(&self, label: u32) -> VamanaParams {
        VamanaParams {
            max_degree: self.r_small,
            search_list_size: self.l_small,
            alpha: self.alpha,
            medoid: self.medoid,
            seed: label_seed(self.seed, label),
            max_visits: self.max_visits,
        }
    }
}

/// Decorrelate per-label seeds (SplitMix64 increment).
fn label_seed(seed: u64, label: u32) -> u64 {
    seed.wrapping_add(u64::from(label).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// A stitched graph with per-label entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchedIndex {
    graph: Graph,
    labels: LabelPartition,
    label_medoids: BTreeMap<u32, u32>,
    entry_point: u32,
}

impl StitchedIndex {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn labels(&self) -> &LabelPartition {
        &self.labels
    }

    /// Global entry point (the medoid hint, or the dataset medoid).
    pub fn entry_point(&self) -> u32 {
        self.entry_point
    }

    /// Global id of the medoid of `label`'s points.
    pub fn label_medoid(&self, label: u32) -> Option<u32> {
        self.label_medoids.get(&label).copied()
    }

    /// Unfiltered k-NN search.
    ///
    /// Sub-graphs only link points that share a label, so labels with no
    /// common points stay disconnected. The walk therefore starts from the
    /// global entry point and from every label medoid.
    pub fn search(
        &self,
        data: &Dataset,
        query: &[f32],
        k: usize,
        l: usize,
    ) -> Result<Vec<(u32, f32)>> {
        let starts: Vec<u32> = std::iter::once(self.entry_point)
            .chain(self.label_medoids.values().copied())
            .collect();
        let params = SearchParams::new(k, l);
        let outcome = multi_start_search(&self.graph, data, query, &starts, &params, &NoFilter)?;
        Ok(outcome.results)
    }

    /// k-NN search restricted to points carrying `label`.
    pub fn filtered_search(
        &self,
        data: &Dataset,
        query: &[f32],
        label: u32,
        k: usize,
        l: usize,
    ) -> Result<Vec<(u32, f32)>> {
        let start = self
            .label_medoid(label)
            .ok_or_else(|| VamanaError::InvalidInput(format!("unknown label {label}")))?;
        let members = self.labels.members(label);
        let filter = FnFilter(|id: u32| members.binary_search(&id).is_ok());

        let outcome = filtered_greedy_search(
            &self.graph,
            data,
            query,
            start,
            &SearchParams::new(k, l),
            &filter,
        )?;
        Ok(outcome.results)
    }
}

/// Build a stitched graph over `data` grouped by `labels`.
pub fn build_stitched(
    data: &Dataset,
    labels: &LabelPartition,
    params: &StitchedParams,
) -> Result<StitchedIndex> {
    build_stitched_with_monitor(data, labels, params, &NoMonitor)
}

/// Build a stitched graph, reporting progress after every finished label.
pub fn build_stitched_with_monitor<M: BuildMonitor + ?Sized>(
    data: &Dataset,
    labels: &LabelPartition,
    params: &StitchedParams,
    monitor: &M,
) -> Result<StitchedIndex> {
    params.validate()?;
    let n = data.len();
    if n == 0 {
        return Err(VamanaError::InvalidInput("dataset is empty".into()));
    }
    if labels.num_points() != n {
        return Err(VamanaError::InvalidInput(format!(
            "labels cover {} points but dataset has {n}",
            labels.num_points()
        )));
    }
    if let Some(hint) = params.medoid_hint {
        if hint as usize >= n {
            return Err(VamanaError::InvalidInput(format!(
                "medoid hint {hint} out of range for {n} points"
            )));
        }
    }

    let started = Instant::now();
    let total_labels = labels.num_labels();
    tracing::info!(
        n,
        labels = total_labels,
        l_small = params.l_small,
        r_small = params.r_small,
        r_stitched = params.r_stitched,
        alpha = params.alpha,
        "building stitched vamana graph"
    );

    let mut graph = Graph::new(n);
    let mut label_medoids = BTreeMap::new();

    for (done, (label, members)) in labels.iter().enumerate() {
        let sub_data = data.subset(members)?;
        let sub = build_vamana(&sub_data, &params.label_params(label))?;

        // Same endpoints, so the cached distances stay valid after remapping.
        for (local, &global) in members.iter().enumerate() {
            for e in sub.graph().neighbors(local as u32) {
                let target = members[e.id as usize];
                if !graph.has_edge(global, target) {
                    graph.push_edge(global, Edge::new(target, e.distance));
                }
            }
        }
        label_medoids.insert(label, members[sub.medoid() as usize]);

        tracing::debug!(
            label,
            points = members.len(),
            edges = sub.graph().edge_count(),
            "label sub-graph merged"
        );
        if monitor.on_label(label, done + 1, total_labels).is_break() {
            return Err(VamanaError::Cancelled {
                processed: done + 1,
                total: total_labels,
            });
        }
    }

    let mut repruned = 0usize;
    for node in 0..n as u32 {
        if graph.out_degree(node) > params.r_stitched {
            robust_prune(&mut graph, data, node, [], params.alpha, params.r_stitched)?;
            repruned += 1;
        }
    }
    tracing::debug!(repruned, "stitched degree bound restored");

    let entry_point = match params.medoid_hint {
        Some(hint) => hint,
        None => find_medoid(data, &params.medoid)?,
    };

    tracing::info!(
        entry_point,
        edges = graph.edge_count(),
        max_degree = graph.max_out_degree(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "stitched vamana graph built"
    );

    Ok(StitchedIndex {
        graph,
        labels: labels.clone(),
        label_medoids,
        entry_point,
    })
}
