//! Directed proximity graph with cached edge distances.

use smallvec::SmallVec;
use std::collections::{HashSet, VecDeque};

/// Outgoing edge: neighbor id plus the distance from the owning node to it,
/// computed when the edge was created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub id: u32,
    pub distance: f32,
}

impl Edge {
    pub fn new(id: u32, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Adjacency list of one node.
///
/// Using SmallVec to keep typical degrees (R = 16-32) inline.
pub type Adjacency = SmallVec<[Edge; 32]>;

/// Directed graph over node ids `0..n`. The node count never changes after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adj: Vec<Adjacency>,
}

/// Degree summary of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub min_degree: usize,
    pub max_degree: usize,
    pub avg_degree: f32,
    /// Nodes with no outgoing edges.
    pub isolated_nodes: usize,
}

impl Graph {
    /// Graph with `n` nodes and no edges.
    pub fn new(n: usize) -> Self {
        Self {
            adj: vec![Adjacency::new(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.adj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    /// Whether `id` is a node of this graph.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        (id as usize) < self.adj.len()
    }

    /// Outgoing edges of `id`, in insertion order.
    #[inline]
    pub fn neighbors(&self, id: u32) -> &[Edge] {
        &self.adj[id as usize]
    }

    pub fn neighbor_ids(&self, id: u32) -> impl Iterator<Item = u32> + '_ {
        self.adj[id as usize].iter().map(|e| e.id)
    }

    #[inline]
    pub fn out_degree(&self, id: u32) -> usize {
        self.adj[id as usize].len()
    }

    pub fn has_edge(&self, from: u32, to: u32) -> bool {
        self.adj[from as usize].iter().any(|e| e.id == to)
    }

    /// Replace the outgoing edges of `id`.
    pub fn set_neighbors<I: IntoIterator<Item = Edge>>(&mut self, id: u32, edges: I) {
        let slot = &mut self.adj[id as usize];
        slot.clear();
        slot.extend(edges);
    }

    /// Append one outgoing edge to `id` without any degree check.
    pub fn push_edge(&mut self, id: u32, edge: Edge) {
        self.adj[id as usize].push(edge);
    }

    /// Exclusive access to a single node's adjacency list.
    pub(crate) fn adjacency_mut(&mut self, id: u32) -> &mut Adjacency {
        &mut self.adj[id as usize]
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(|a| a.len()).sum()
    }

    pub fn max_out_degree(&self) -> usize {
        self.adj.iter().map(|a| a.len()).max().unwrap_or(0)
    }

    pub fn has_self_loops(&self) -> bool {
        self.adj
            .iter()
            .enumerate()
            .any(|(u, a)| a.iter().any(|e| e.id as usize == u))
    }

    pub fn has_duplicate_edges(&self) -> bool {
        self.adj.iter().any(|a| {
            let mut seen = HashSet::with_capacity(a.len());
            a.iter().any(|e| !seen.insert(e.id))
        })
    }

    /// Breadth-first hop count from `start` to every node; `None` if unreachable.
    pub fn hop_distances(&self, start: u32) -> Vec<Option<usize>> {
        let mut hops = vec![None; self.adj.len()];
        if !self.contains(start) {
            return hops;
        }

        let mut queue = VecDeque::new();
        hops[start as usize] = Some(0);
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            let next = hops[u as usize].map_or(0, |h| h + 1);
            for e in self.neighbors(u) {
                let slot = &mut hops[e.id as usize];
                if slot.is_none() {
                    *slot = Some(next);
                    queue.push_back(e.id);
                }
            }
        }

        hops
    }

    pub fn stats(&self) -> GraphStats {
        let degrees: Vec<usize> = self.adj.iter().map(|a| a.len()).collect();
        let num_edges: usize = degrees.iter().sum();
        GraphStats {
            num_nodes: self.adj.len(),
            num_edges,
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            avg_degree: if degrees.is_empty() {
                0.0
            } else {
                num_edges as f32 / degrees.len() as f32
            },
            isolated_nodes: degrees.iter().filter(|&&d| d == 0).count(),
        }
    }

    /// Plain `(neighbor, distance)` lists, one per node, for external consumers.
    pub fn to_adjacency_lists(&self) -> Vec<Vec<(u32, f32)>> {
        self.adj
            .iter()
            .map(|a| a.iter().map(|e| (e.id, e.distance)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> Graph {
        // 0 -> 1 -> 2 -> 3, node 4 isolated
        let mut g = Graph::new(5);
        g.push_edge(0, Edge::new(1, 1.0));
        g.push_edge(1, Edge::new(2, 1.0));
        g.push_edge(2, Edge::new(3, 1.0));
        g
    }

    #[test]
    fn hop_distances_follow_direction() {
        let g = line_graph();
        assert_eq!(g.hop_distances(0), vec![Some(0), Some(1), Some(2), Some(3), None]);
        assert_eq!(g.hop_distances(3), vec![None, None, None, Some(0), None]);
        assert!(g.hop_distances(99).iter().all(Option::is_none));
    }

    #[test]
    fn set_neighbors_replaces_list() {
        let mut g = line_graph();
        g.set_neighbors(0, [Edge::new(2, 2.0), Edge::new(3, 3.0)]);
        assert_eq!(g.out_degree(0), 2);
        assert!(!g.has_edge(0, 1));
        assert!(g.has_edge(0, 3));
    }

    #[test]
    fn detects_self_loops_and_duplicates() {
        let mut g = line_graph();
        assert!(!g.has_self_loops());
        assert!(!g.has_duplicate_edges());

        g.push_edge(1, Edge::new(2, 1.0));
        assert!(g.has_duplicate_edges());

        g.push_edge(4, Edge::new(4, 0.0));
        assert!(g.has_self_loops());
    }

    #[test]
    fn stats_summarise_degrees() {
        let stats = line_graph().stats();
        assert_eq!(stats.num_nodes, 5);
        assert_eq!(stats.num_edges, 3);
        assert_eq!(stats.max_degree, 1);
        assert_eq!(stats.min_degree, 0);
        assert_eq!(stats.isolated_nodes, 2);
        assert!((stats.avg_degree - 0.6).abs() < 1e-6);
    }

    #[test]
    fn adjacency_lists_carry_distances() {
        let mut g = line_graph();
        g.push_edge(0, Edge::new(3, 3.0));
        let lists = g.to_adjacency_lists();
        assert_eq!(lists.len(), 5);
        assert_eq!(lists[0], vec![(1, 1.0), (3, 3.0)]);
        assert_eq!(lists[2], vec![(3, 1.0)]);
        assert!(lists[4].is_empty());
    }
}
