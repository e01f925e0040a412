use serde::{Deserialize, Serialize};

/// Sparse vector of `f32` weights keyed by feature id.
///
/// Indices are strictly increasing; zero weights are never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from unordered `(feature, weight)` pairs. Duplicate features are summed.
    #[must_use]
    pub fn from_pairs(dim: usize, mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_unstable_by_key(|(i, _)| *i);
        let mut indices = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            debug_assert!((i as usize) < dim);
            if indices.last() == Some(&i) {
                if let Some(last) = values.last_mut() {
                    *last += v;
                }
            } else {
                indices.push(i);
                values.push(v);
            }
        }
        let mut vector = Self { dim, indices, values };
        vector.prune_zeros();
        vector
    }

    fn prune_zeros(&mut self) {
        if self.values.iter().all(|v| *v != 0.0) {
            return;
        }
        let (indices, values) = self
            .indices
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (*i, *v))
            .unzip();
        self.indices = indices;
        self.values = values;
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Sparse dot product by merging the two index lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; zero vectors and dimension mismatches score 0.
    #[inline]
    pub fn cosine_similarity(&self, other: &SparseVector) -> f32 {
        if self.dim != other.dim {
            return 0.0;
        }
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        self.dot(other) / (norm_a * norm_b)
    }

    /// Euclidean distance, `INFINITY` on dimension mismatch.
    pub fn l2_distance(&self, other: &SparseVector) -> f32 {
        if self.dim != other.dim {
            return f32::INFINITY;
        }
        let sq_a: f32 = self.values.iter().map(|v| v * v).sum();
        let sq_b: f32 = other.values.iter().map(|v| v * v).sum();
        // clamp rounding noise for identical vectors
        (sq_a + sq_b - 2.0 * self.dot(other)).max(0.0).sqrt()
    }

    /// Normalize the vector to unit length
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.values {
                *x *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(5, vec![(3, 1.0), (0, 2.0), (3, 0.5), (1, 0.0)]);
        let entries: Vec<_> = v.iter().collect();
        assert_eq!(entries, vec![(0, 2.0), (3, 1.5)]);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_cosine_similarity() {
        let v1 = SparseVector::from_pairs(2, vec![(0, 1.0)]);
        let v2 = SparseVector::from_pairs(2, vec![(0, 3.0)]);
        assert!((v1.cosine_similarity(&v2) - 1.0).abs() < 1e-6);

        let v3 = SparseVector::from_pairs(2, vec![(1, 1.0)]);
        assert!(v1.cosine_similarity(&v3).abs() < 1e-6);
        assert_eq!(v1.cosine_similarity(&SparseVector::zeros(2)), 0.0);
    }

    #[test]
    fn test_l2_distance() {
        let v1 = SparseVector::zeros(2);
        let v2 = SparseVector::from_pairs(2, vec![(0, 3.0), (1, 4.0)]);
        assert!((v1.l2_distance(&v2) - 5.0).abs() < 1e-6);
        assert_eq!(v2.l2_distance(&v2), 0.0);
        assert_eq!(v1.l2_distance(&SparseVector::zeros(3)), f32::INFINITY);
    }

    #[test]
    fn test_normalize() {
        let v = SparseVector::from_pairs(4, vec![(1, 3.0), (2, 4.0)]).normalized();
        assert!((v.norm() - 1.0).abs() < 1e-6);
        let mut zero = SparseVector::zeros(4);
        zero.normalize();
        assert!(zero.is_zero());
    }
}
