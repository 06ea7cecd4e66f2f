//! RobustPrune: alpha-pruning neighbor selection.
//!
//! Given a node `v` and a candidate pool, repeatedly keep the closest remaining
//! candidate `p*` and drop every remaining `p'` that `p*` already covers:
//!
//! ```text
//! alpha * d(p*, p') <= d(v, p')
//! ```
//!
//! `alpha = 1.0` is strict diversity pruning (an RNG-like graph). Larger alpha
//! keeps more long edges, which makes greedy routing more robust at the cost
//! of density.
//!
//! # References
//!
//! - Subramanya et al. (2019): "DiskANN: Fast Accurate Billion-point Nearest
//!   Neighbor Search on a Single Node", Algorithm 2

use crate::dataset::Dataset;
use crate::error::{Result, VamanaError};
use crate::graph::{Edge, Graph};
use std::collections::HashSet;

pub(crate) fn check_alpha(alpha: f32) -> Result<()> {
    if !alpha.is_finite() || alpha < 1.0 {
        return Err(VamanaError::InvalidInput(format!(
            "alpha must be a finite value >= 1.0, got {alpha}"
        )));
    }
    Ok(())
}

/// Prune `node`'s neighborhood to at most `r` edges chosen from
/// `candidates ∪ current out-neighbors`, replacing its adjacency list.
///
/// Returns the number of edges kept. Zero is not an error but leaves the node
/// without outgoing edges, which is logged.
pub fn robust_prune<I>(
    graph: &mut Graph,
    data: &Dataset,
    node: u32,
    candidates: I,
    alpha: f32,
    r: usize,
) -> Result<usize>
where
    I: IntoIterator<Item = u32>,
{
    if !graph.contains(node) {
        return Err(VamanaError::InvalidState(format!(
            "cannot prune node {node} in a graph of {} nodes",
            graph.len()
        )));
    }

    let pool = candidates.into_iter().chain(graph.neighbor_ids(node));
    let selected = select_neighbors(graph.len(), data, node, pool, alpha, r)?;

    if selected.is_empty() {
        tracing::warn!(node, "robust prune left node without out-neighbors");
    }

    let kept = selected.len();
    let slot = graph.adjacency_mut(node);
    slot.clear();
    slot.extend(selected);
    Ok(kept)
}

/// Pure selection step of [`robust_prune`]: reads only the dataset.
///
/// `pool` may contain duplicates and `node` itself; both are removed. Every
/// returned edge carries a freshly computed `d(node, p)`.
pub fn select_neighbors<I>(
    num_nodes: usize,
    data: &Dataset,
    node: u32,
    pool: I,
    alpha: f32,
    r: usize,
) -> Result<Vec<Edge>>
where
    I: IntoIterator<Item = u32>,
{
    check_alpha(alpha)?;
    if r == 0 {
        return Err(VamanaError::InvalidInput(
            "degree bound R must be greater than 0".into(),
        ));
    }

    let mut seen: HashSet<u32> = HashSet::new();
    let mut sorted: Vec<Edge> = Vec::new();
    for id in pool {
        if id as usize >= num_nodes {
            return Err(VamanaError::InvalidInput(format!(
                "candidate {id} is not in a graph of {num_nodes} nodes"
            )));
        }
        if id == node || !seen.insert(id) {
            continue;
        }
        sorted.push(Edge::new(id, data.distance(node, id)));
    }
    sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));

    let mut alive = vec![true; sorted.len()];
    let mut selected: Vec<Edge> = Vec::with_capacity(r.min(sorted.len()));

    for i in 0..sorted.len() {
        if selected.len() >= r {
            break;
        }
        if !alive[i] {
            continue;
        }

        let star = sorted[i];
        selected.push(star);

        for j in (i + 1)..sorted.len() {
            if alive[j] && alpha * data.distance(star.id, sorted[j].id) <= sorted[j].distance {
                alive[j] = false;
            }
        }
    }

    Ok(selected)
}
