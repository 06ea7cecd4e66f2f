//! Random R-regular graph initialization.

use crate::dataset::Dataset;
use crate::error::{Result, VamanaError};
use crate::graph::{Edge, Graph};
use rand::seq::index;
use rand::Rng;

/// Build a random directed graph where every node points to `r` distinct
/// other nodes chosen uniformly.
///
/// When `r >= n - 1` every node points to all other nodes (fully connected).
/// The graph depends only on `data` and the state of `rng`.
pub fn random_graph<R: Rng + ?Sized>(data: &Dataset, r: usize, rng: &mut R) -> Result<Graph> {
    if r == 0 {
        return Err(VamanaError::InvalidInput(
            "degree bound R must be greater than 0".into(),
        ));
    }
    let n = data.len();
    if n == 0 {
        return Err(VamanaError::InvalidInput("dataset is empty".into()));
    }

    let mut graph = Graph::new(n);
    let others = n - 1;
    let degree = r.min(others);

    for i in 0..n {
        let node = i as u32;
        let slot = graph.adjacency_mut(node);
        slot.reserve(degree);

        if degree == others {
            for j in (0..n).filter(|&j| j != i) {
                slot.push(Edge::new(j as u32, data.distance(node, j as u32)));
            }
            continue;
        }

        // Sample from the n-1 ids other than i, then shift past i.
        for pick in index::sample(rng, others, degree).into_iter() {
            let j = (if pick >= i { pick + 1 } else { pick }) as u32;
            slot.push(Edge::new(j, data.distance(node, j)));
        }
    }

    Ok(graph)
}
