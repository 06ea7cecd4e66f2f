//! Euclidean distance, the single metric every graph in this crate is built on.
//!
//! Edge weights, pruning decisions and search ordering all go through
//! [`l2_distance`]. Swapping metrics is not supported: a graph built under one
//! metric is not navigable under another.

/// L2 (Euclidean) distance.
///
/// If dimensions mismatch, this returns `f32::INFINITY` (so it is never selected as a
/// nearest neighbor).
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    l2_distance_squared(a, b).sqrt()
}

/// Squared L2 distance (cheaper when only comparing).
#[inline]
#[must_use]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
