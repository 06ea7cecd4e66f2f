//! Best-first greedy search with a bounded frontier.
//!
//! # Algorithm
//!
//! The candidate list holds at most `L` nodes sorted by distance to the query.
//! Each step takes the closest candidate not yet visited, marks it visited and
//! inserts its (not yet seen) out-neighbors, then truncates the list back to
//! `L`. The search stops once every candidate in the list has been visited.
//!
//! The top `k` of the final list are the results. The visited list (every
//! expanded node, in expansion order) is the denser pool that construction
//! hands to robust pruning.
//!
//! A [`FilterPredicate`] restricts which neighbors are expanded, which is how
//! label-scoped search over a stitched graph works. [`multi_start_search`]
//! seeds the walk from several entry points for graphs whose regions are not
//! connected to each other.

use crate::dataset::Dataset;
use crate::error::{Result, VamanaError};
use crate::graph::Graph;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Filter predicate for greedy search.
pub trait FilterPredicate {
    /// Check if a node may be expanded.
    fn matches(&self, node_id: u32) -> bool;
}

/// Simple function-based filter.
pub struct FnFilter<F: Fn(u32) -> bool>(pub F);

impl<F: Fn(u32) -> bool> FilterPredicate for FnFilter<F> {
    fn matches(&self, node_id: u32) -> bool {
        self.0(node_id)
    }
}

/// Always-pass filter (no filtering).
pub struct NoFilter;

impl FilterPredicate for NoFilter {
    fn matches(&self, _node_id: u32) -> bool {
        true
    }
}

/// Parameters of a single greedy search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchParams {
    /// Number of results to return.
    pub k: usize,
    /// Frontier bound (L). Must be at least `k`.
    pub l: usize,
    /// Abort with [`VamanaError::ResourceExhausted`] after this many expansions.
    /// `None` bounds the search only by the node count.
    pub max_visits: Option<usize>,
}

impl SearchParams {
    pub fn new(k: usize, l: usize) -> Self {
        Self {
            k,
            l,
            max_visits: None,
        }
    }

    pub fn with_max_visits(mut self, limit: usize) -> Self {
        self.max_visits = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(VamanaError::InvalidInput("k must be greater than 0".into()));
        }
        if self.l == 0 {
            return Err(VamanaError::InvalidInput(
                "search list size L must be greater than 0".into(),
            ));
        }
        if self.k > self.l {
            return Err(VamanaError::InvalidInput(format!(
                "k ({}) must not exceed L ({})",
                self.k, self.l
            )));
        }
        if self.max_visits == Some(0) {
            return Err(VamanaError::InvalidInput(
                "max_visits must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Output of [`greedy_search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Up to `k` `(id, distance)` pairs, closest first, ties by lower id.
    pub results: Vec<(u32, f32)>,
    /// Every expanded node with its distance to the query, in expansion order.
    pub visited: Vec<(u32, f32)>,
}

impl SearchOutcome {
    pub fn result_ids(&self) -> Vec<u32> {
        self.results.iter().map(|&(id, _)| id).collect()
    }

    pub fn visited_ids(&self) -> Vec<u32> {
        self.visited.iter().map(|&(id, _)| id).collect()
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    id: u32,
    distance: f32,
    visited: bool,
}

impl Slot {
    fn order(&self, distance: f32, id: u32) -> Ordering {
        self.distance
            .total_cmp(&distance)
            .then_with(|| self.id.cmp(&id))
    }
}

/// Size-capped candidate list sorted by `(distance, id)`.
///
/// `cursor` is the position of the closest unvisited slot (or `len` if none),
/// so picking the next node to expand is O(1) amortized.
#[derive(Debug)]
pub(crate) struct CandidateList {
    slots: Vec<Slot>,
    capacity: usize,
    cursor: usize,
}

impl CandidateList {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity + 1),
            capacity,
            cursor: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Insert unless the list is full and the candidate is no better than the worst.
    pub(crate) fn insert(&mut self, id: u32, distance: f32) -> bool {
        self.insert_slot(id, distance, false)
    }

    /// Insert a node that has already been expanded.
    pub(crate) fn insert_visited(&mut self, id: u32, distance: f32) -> bool {
        self.insert_slot(id, distance, true)
    }

    fn insert_slot(&mut self, id: u32, distance: f32, visited: bool) -> bool {
        if self.slots.len() >= self.capacity {
            if let Some(worst) = self.slots.last() {
                if worst.order(distance, id) != Ordering::Greater {
                    return false;
                }
            }
        }

        let pos = self
            .slots
            .partition_point(|s| s.order(distance, id) == Ordering::Less);
        self.slots.insert(
            pos,
            Slot {
                id,
                distance,
                visited,
            },
        );
        self.slots.truncate(self.capacity);

        if pos < self.cursor {
            self.cursor = pos;
        }
        true
    }

    /// Mark the closest unvisited candidate visited and return it.
    pub(crate) fn next_unvisited(&mut self) -> Option<(u32, f32)> {
        while self.cursor < self.slots.len() && self.slots[self.cursor].visited {
            self.cursor += 1;
        }
        let slot = self.slots.get_mut(self.cursor)?;
        slot.visited = true;
        let picked = (slot.id, slot.distance);
        self.cursor += 1;
        Some(picked)
    }

    pub(crate) fn top(&self, k: usize) -> Vec<(u32, f32)> {
        self.slots
            .iter()
            .take(k)
            .map(|s| (s.id, s.distance))
            .collect()
    }
}

/// Greedy search from `start` toward `query`, expanding every neighbor.
pub fn greedy_search(
    graph: &Graph,
    data: &Dataset,
    query: &[f32],
    start: u32,
    params: &SearchParams,
) -> Result<SearchOutcome> {
    filtered_greedy_search(graph, data, query, start, params, &NoFilter)
}

/// Greedy search from `start` that only expands neighbors passing `filter`.
///
/// The start node is always visited first, whether or not it passes the filter.
pub fn filtered_greedy_search<F: FilterPredicate + ?Sized>(
    graph: &Graph,
    data: &Dataset,
    query: &[f32],
    start: u32,
    params: &SearchParams,
    filter: &F,
) -> Result<SearchOutcome> {
    multi_start_search(graph, data, query, &[start], params, filter)
}

/// Greedy search seeded with several entry points.
///
/// Every start is expanded, in the given order, before the best-first loop
/// begins. Repeated starts are expanded once. Use this when the graph has
/// components that one entry point cannot reach, such as the per-label
/// regions of a stitched graph.
pub fn multi_start_search<F: FilterPredicate + ?Sized>(
    graph: &Graph,
    data: &Dataset,
    query: &[f32],
    starts: &[u32],
    params: &SearchParams,
    filter: &F,
) -> Result<SearchOutcome> {
    params.validate()?;
    data.check_query(query)?;
    if graph.len() != data.len() {
        return Err(VamanaError::InvalidState(format!(
            "graph has {} nodes but dataset has {} points",
            graph.len(),
            data.len()
        )));
    }
    if starts.is_empty() {
        return Err(VamanaError::InvalidInput(
            "search needs at least one start node".into(),
        ));
    }
    if let Some(&bad) = starts.iter().find(|&&s| !graph.contains(s)) {
        return Err(VamanaError::InvalidState(format!(
            "start node {bad} is not in a graph of {} nodes",
            graph.len()
        )));
    }

    let mut walk = Walk {
        graph,
        data,
        query,
        limit: params.max_visits.unwrap_or(usize::MAX),
        candidates: CandidateList::with_capacity(params.l),
        seen: HashSet::with_capacity(params.l * 2),
        visited: Vec::with_capacity(params.l),
    };

    for &start in starts {
        if !walk.seen.insert(start) {
            continue;
        }
        let distance = data.distance_to(query, start);
        walk.candidates.insert_visited(start, distance);
        walk.expand(start, distance, filter)?;
    }
    while let Some((current, distance)) = walk.candidates.next_unvisited() {
        walk.expand(current, distance, filter)?;
    }

    Ok(SearchOutcome {
        results: walk.candidates.top(params.k),
        visited: walk.visited,
    })
}

/// Mutable state of one search.
struct Walk<'a> {
    graph: &'a Graph,
    data: &'a Dataset,
    query: &'a [f32],
    limit: usize,
    candidates: CandidateList,
    seen: HashSet<u32>,
    visited: Vec<(u32, f32)>,
}

impl Walk<'_> {
    /// Record `current` as visited and offer its unseen neighbors.
    fn expand<F: FilterPredicate + ?Sized>(
        &mut self,
        current: u32,
        distance: f32,
        filter: &F,
    ) -> Result<()> {
        if self.visited.len() >= self.limit {
            return Err(VamanaError::ResourceExhausted {
                visited: self.visited.len() + 1,
                limit: self.limit,
            });
        }
        self.visited.push((current, distance));

        for nb in self.graph.neighbor_ids(current) {
            if !filter.matches(nb) || !self.seen.insert(nb) {
                continue;
            }
            self.candidates.insert(nb, self.data.distance_to(self.query, nb));
        }
        Ok(())
    }
}
