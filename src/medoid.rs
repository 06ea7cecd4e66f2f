//! Medoid selection: the point minimizing total distance to the others.
//!
//! The medoid is the entry point of every greedy search, so which strategy is
//! used is always an explicit configuration choice:
//!
//! - [`MedoidStrategy::Exact`]: O(n²) distance sums. The correctness baseline.
//! - [`MedoidStrategy::Sampled`]: score every point against a seeded random
//!   reference sample. O(n·s), reproducible for a fixed seed.
//!
//! Both break ties by lowest id.

use crate::dataset::Dataset;
use crate::error::{Result, VamanaError};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// How to pick the medoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedoidStrategy {
    /// Exact sum of distances to all other points.
    #[default]
    Exact,
    /// Sum of distances to `sample_size` reference points drawn with `seed`.
    Sampled { sample_size: usize, seed: u64 },
}

impl MedoidStrategy {
    pub fn validate(&self) -> Result<()> {
        match self {
            MedoidStrategy::Sampled { sample_size: 0, .. } => Err(VamanaError::InvalidInput(
                "sampled medoid needs a sample size greater than 0".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Find the medoid of `data` with the given strategy.
pub fn find_medoid(data: &Dataset, strategy: &MedoidStrategy) -> Result<u32> {
    strategy.validate()?;
    if data.is_empty() {
        return Err(VamanaError::InvalidInput("dataset is empty".into()));
    }

    match *strategy {
        MedoidStrategy::Exact => Ok(exact_medoid(data)),
        MedoidStrategy::Sampled { sample_size, seed } => {
            if sample_size >= data.len() {
                return Ok(exact_medoid(data));
            }
            Ok(sampled_medoid(data, sample_size, seed))
        }
    }
}

fn exact_medoid(data: &Dataset) -> u32 {
    let n = data.len();
    let mut sums = vec![0.0f64; n];

    // Symmetric metric: each pair once.
    for i in 0..n {
        for j in (i + 1)..n {
            let d = data.distance(i as u32, j as u32) as f64;
            sums[i] += d;
            sums[j] += d;
        }
    }

    argmin(&sums)
}

fn sampled_medoid(data: &Dataset, sample_size: usize, seed: u64) -> u32 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pivots: Vec<u32> = index::sample(&mut rng, data.len(), sample_size)
        .into_iter()
        .map(|p| p as u32)
        .collect();
    // Fixed summation order regardless of how the sample was drawn.
    pivots.sort_unstable();

    let scores: Vec<f64> = (0..data.len() as u32)
        .map(|i| pivots.iter().map(|&p| data.distance(i, p) as f64).sum())
        .collect();

    argmin(&scores)
}

/// Index of the smallest score; the first one wins ties.
fn argmin(scores: &[f64]) -> u32 {
    let mut best_id = 0usize;
    let mut best_score = f64::INFINITY;
    for (i, &s) in scores.iter().enumerate() {
        if s < best_score {
            best_score = s;
            best_id = i;
        }
    }
    best_id as u32
}
