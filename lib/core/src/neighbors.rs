//! Exact nearest-neighbour index over the vectorized vocabulary rows.
//!
//! A brute-force scan keeps results reproducible: candidates are ordered by
//! distance, then by ascending row position when distances tie.

use crate::vector::SparseVector;
use crate::{Error, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Rows scanned sequentially below this size; the rayon split costs more than it saves.
const PARALLEL_SCAN_MIN_ROWS: usize = 4096;

/// Row positions of the nearest vocabulary entries, closest first.
pub type CandidateIndices = SmallVec<[usize; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

impl std::str::FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "cosine" => Ok(Metric::Cosine),
            other => Err(Error::InvalidConfig(format!("unknown metric '{}'", other))),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Euclidean => f.write_str("euclidean"),
            Metric::Cosine => f.write_str("cosine"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborIndex {
    dim: usize,
    metric: Metric,
    /// Default number of neighbours returned per query.
    n_neighbors: usize,
    rows: Vec<SparseVector>,
}

impl NeighborIndex {
    pub fn new(dim: usize, metric: Metric, n_neighbors: usize) -> Self {
        Self {
            dim,
            metric,
            n_neighbors,
            rows: Vec::new(),
        }
    }

    /// Append a row; its position is the next vocabulary row index.
    pub fn push(&mut self, row: SparseVector) -> Result<()> {
        if row.dim() != self.dim {
            return Err(Error::Training(format!(
                "row dimension {} does not match index dimension {}",
                row.dim(),
                self.dim
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[inline]
    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    fn distance(&self, row: &SparseVector, query: &SparseVector) -> f32 {
        match self.metric {
            Metric::Euclidean => row.l2_distance(query),
            Metric::Cosine => 1.0 - row.cosine_similarity(query),
        }
    }

    /// The `k` closest rows to `query`, as `(row, distance)`, closest first.
    /// `k` larger than the index returns every row.
    pub fn search(&self, query: &SparseVector, k: usize) -> Result<Vec<(usize, f32)>> {
        if self.rows.is_empty() {
            return Err(Error::Inference("neighbour index is empty".to_string()));
        }
        if k == 0 {
            return Err(Error::Inference("neighbour count must be at least 1".to_string()));
        }
        if query.dim() != self.dim {
            return Err(Error::Inference(format!(
                "query dimension {} does not match index dimension {}",
                query.dim(),
                self.dim
            )));
        }

        let score = |(i, row): (usize, &SparseVector)| (OrderedFloat(self.distance(row, query)), i);
        let mut scored: Vec<(OrderedFloat<f32>, usize)> = if self.rows.len() >= PARALLEL_SCAN_MIN_ROWS {
            self.rows.par_iter().enumerate().map(score).collect()
        } else {
            self.rows.iter().enumerate().map(score).collect()
        };

        let k = k.min(scored.len());
        // (distance, row) ordering gives the ascending-row tie-break
        if k < scored.len() {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        scored.sort_unstable();
        Ok(scored.into_iter().map(|(d, i)| (i, d.into_inner())).collect())
    }

    /// Row positions only, see [`NeighborIndex::search`].
    pub fn nearest(&self, query: &SparseVector, k: usize) -> Result<CandidateIndices> {
        Ok(self.search(query, k)?.into_iter().map(|(i, _)| i).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, pairs: Vec<(u32, f32)>) -> SparseVector {
        SparseVector::from_pairs(dim, pairs).normalized()
    }

    fn index(metric: Metric) -> NeighborIndex {
        let mut idx = NeighborIndex::new(3, metric, 2);
        idx.push(unit(3, vec![(0, 1.0)])).unwrap();
        idx.push(unit(3, vec![(1, 1.0)])).unwrap();
        idx.push(unit(3, vec![(0, 1.0), (1, 1.0)])).unwrap();
        idx.push(unit(3, vec![(0, 1.0)])).unwrap();
        idx
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let idx = index(Metric::Euclidean);
        let q = unit(3, vec![(0, 1.0), (1, 0.2)]);
        let hits = idx.nearest(&q, 3).unwrap();
        assert_eq!(hits.as_slice(), &[0, 3, 2]);
    }

    #[test]
    fn test_ties_broken_by_row_position() {
        for metric in [Metric::Euclidean, Metric::Cosine] {
            let idx = index(metric);
            let q = unit(3, vec![(0, 1.0)]);
            // rows 0 and 3 are identical
            assert_eq!(idx.nearest(&q, 2).unwrap().as_slice(), &[0, 3]);
        }
        // a zero query has cosine distance 1 to every row
        let idx = index(Metric::Cosine);
        let all = idx.nearest(&SparseVector::zeros(3), 4).unwrap();
        assert_eq!(all.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_deterministic() {
        let idx = index(Metric::Cosine);
        let q = unit(3, vec![(0, 0.3), (1, 0.7)]);
        let first = idx.nearest(&q, 4).unwrap();
        for _ in 0..10 {
            assert_eq!(idx.nearest(&q, 4).unwrap(), first);
        }
    }

    #[test]
    fn test_k_clamped_to_len() {
        let idx = index(Metric::Euclidean);
        let q = unit(3, vec![(2, 1.0)]);
        assert_eq!(idx.nearest(&q, 50).unwrap().len(), 4);
    }

    #[test]
    fn test_inference_errors() {
        let empty = NeighborIndex::new(3, Metric::Euclidean, 5);
        let q = unit(3, vec![(0, 1.0)]);
        assert!(matches!(empty.nearest(&q, 1), Err(Error::Inference(_))));

        let idx = index(Metric::Euclidean);
        assert!(matches!(idx.nearest(&q, 0), Err(Error::Inference(_))));
        assert!(matches!(
            idx.nearest(&SparseVector::zeros(7), 1),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn test_push_rejects_wrong_dimension() {
        let mut idx = NeighborIndex::new(3, Metric::Euclidean, 5);
        assert!(matches!(idx.push(SparseVector::zeros(4)), Err(Error::Training(_))));
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("Cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("l2".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert!("manhattan".parse::<Metric>().is_err());
    }
}
