//! Read-only point storage shared by every build stage.
//!
//! Points are stored row-major in one flat buffer (`n * dimension` floats),
//! the same structure-of-arrays layout the graph builders index into by id.

use crate::distance::l2_distance;
use crate::error::{Result, VamanaError};
use std::collections::BTreeMap;

/// A fixed set of points with uniform dimension and stable ids `0..n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    dimension: usize,
    vectors: Vec<f32>,
}

impl Dataset {
    /// Wrap a flat row-major buffer of `n * dimension` coordinates.
    pub fn new(dimension: usize, vectors: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(VamanaError::InvalidInput(
                "dimension must be greater than 0".into(),
            ));
        }
        if vectors.is_empty() {
            return Err(VamanaError::InvalidInput("dataset is empty".into()));
        }
        if vectors.len() % dimension != 0 {
            return Err(VamanaError::InvalidInput(format!(
                "buffer of {} floats is not a multiple of dimension {dimension}",
                vectors.len()
            )));
        }
        let n = vectors.len() / dimension;
        if u32::try_from(n).is_err() {
            return Err(VamanaError::InvalidInput(format!(
                "{n} points exceed the u32 id space"
            )));
        }
        if let Some(pos) = vectors.iter().position(|x| !x.is_finite()) {
            return Err(VamanaError::InvalidInput(format!(
                "point {} has a non-finite coordinate",
                pos / dimension
            )));
        }

        Ok(Self { dimension, vectors })
    }

    /// Build from one row per point. All rows must share the first row's dimension.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(VamanaError::InvalidInput("dataset is empty".into()));
        };
        let dimension = first.as_ref().len();

        let mut vectors = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dimension {
                return Err(VamanaError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            vectors.extend_from_slice(row);
        }

        Self::new(dimension, vectors)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    /// Always false for a constructed dataset; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Coordinates of point `id`.
    ///
    /// # Panics
    /// If `id` is out of range. Builders only call this with ids they own.
    #[inline]
    pub fn point(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Coordinates of point `id`, or `None` when out of range.
    pub fn get(&self, id: u32) -> Option<&[f32]> {
        ((id as usize) < self.len()).then(|| self.point(id))
    }

    /// Distance between two stored points.
    #[inline]
    pub fn distance(&self, a: u32, b: u32) -> f32 {
        l2_distance(self.point(a), self.point(b))
    }

    /// Distance from an arbitrary query to a stored point.
    #[inline]
    pub fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        l2_distance(query, self.point(id))
    }

    /// Reject queries that cannot be compared against this dataset.
    pub fn check_query(&self, query: &[f32]) -> Result<()> {
        if query.len() != self.dimension {
            return Err(VamanaError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(VamanaError::InvalidInput(
                "query has a non-finite coordinate".into(),
            ));
        }
        Ok(())
    }

    /// Copy the given points into a new dataset with local ids `0..ids.len()`.
    ///
    /// Local id `i` corresponds to global id `ids[i]`.
    pub fn subset(&self, ids: &[u32]) -> Result<Self> {
        let mut vectors = Vec::with_capacity(ids.len() * self.dimension);
        for &id in ids {
            let point = self.get(id).ok_or_else(|| {
                VamanaError::InvalidInput(format!("subset id {id} out of range"))
            })?;
            vectors.extend_from_slice(point);
        }
        Self::new(self.dimension, vectors)
    }
}

/// Node ids grouped by label, in ascending label order.
///
/// A point may carry several labels; it then belongs to several groups. Member
/// lists are in ascending id order, so local ids inside a label's sub-graph are
/// stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPartition {
    groups: BTreeMap<u32, Vec<u32>>,
    num_points: usize,
}

impl LabelPartition {
    /// One label per point. `expected_len` must match the point count.
    pub fn new(labels: &[u32], expected_len: usize) -> Result<Self> {
        if labels.len() != expected_len {
            return Err(VamanaError::InvalidInput(format!(
                "{} labels for {expected_len} points",
                labels.len()
            )));
        }

        let mut groups: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (id, &label) in labels.iter().enumerate() {
            groups.entry(label).or_default().push(id as u32);
        }
        Ok(Self {
            groups,
            num_points: expected_len,
        })
    }

    /// One or more labels per point. Every point needs at least one label;
    /// repeated labels on the same point count once.
    pub fn from_label_sets<S: AsRef<[u32]>>(label_sets: &[S], expected_len: usize) -> Result<Self> {
        if label_sets.len() != expected_len {
            return Err(VamanaError::InvalidInput(format!(
                "{} label sets for {expected_len} points",
                label_sets.len()
            )));
        }

        let mut groups: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (id, set) in label_sets.iter().enumerate() {
            let set = set.as_ref();
            if set.is_empty() {
                return Err(VamanaError::InvalidInput(format!("point {id} has no label")));
            }
            for &label in set {
                let members = groups.entry(label).or_default();
                // Ids arrive in ascending order, so a repeat can only be the last entry.
                if members.last() != Some(&(id as u32)) {
                    members.push(id as u32);
                }
            }
        }
        Ok(Self {
            groups,
            num_points: expected_len,
        })
    }

    pub fn num_labels(&self) -> usize {
        self.groups.len()
    }

    /// Number of points the partition was built for.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Members of `label`, or an empty slice if no point carries it.
    pub fn members(&self, label: u32) -> &[u32] {
        self.groups.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_label(&self, id: u32, label: u32) -> bool {
        self.members(label).binary_search(&id).is_ok()
    }

    /// `(label, members)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.groups.iter().map(|(&l, ids)| (l, ids.as_slice()))
    }
}
