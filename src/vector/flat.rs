//! Exact nearest-neighbor index over a flat array of vectors.
//!
//! Vectors are stored contiguously in position order and every query scans
//! all of them, so answers are exact.
//!
//! # Ordering
//!
//! Results are sorted ascending by squared Euclidean distance. Equal
//! distances are ordered by the smaller position first, and NaN distances
//! sort after every finite one. Because the order is total, the first
//! `k - 1` results of a `k` query are exactly the results of a `k - 1` query.

use std::cmp::Ordering;

use crate::vector::types::{Position, VectorDimension, VectorError};

/// One query hit: the position of a stored vector and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: Position,
    /// Squared Euclidean distance to the query vector.
    pub distance: f32,
}

/// Flat (brute-force) vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: VectorDimension,
    /// `len * dimension` values, vector `i` at `i * dimension..(i + 1) * dimension`.
    data: Vec<f32>,
    len: usize,
}

impl FlatIndex {
    /// Builds an index from `vectors`, assigning positions in slice order.
    ///
    /// An empty slice produces a valid empty index. Every vector must have
    /// exactly `dimension` components; the first one that does not is
    /// reported with its position.
    pub fn build(dimension: VectorDimension, vectors: &[Vec<f32>]) -> Result<Self, VectorError> {
        let dim = dimension.get();
        let mut data = Vec::with_capacity(vectors.len() * dim);

        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dim {
                return Err(VectorError::RaggedVector {
                    position,
                    expected: dim,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            dimension,
            data,
            len: vectors.len(),
        })
    }

    /// Rebuilds an index from its raw contiguous representation.
    ///
    /// `data.len()` must be a multiple of `dimension`.
    pub fn from_raw(dimension: VectorDimension, data: Vec<f32>) -> Result<Self, VectorError> {
        let dim = dimension.get();
        if data.len() % dim != 0 {
            return Err(VectorError::RaggedVector {
                position: data.len() / dim,
                expected: dim,
                actual: data.len() % dim,
            });
        }
        let len = data.len() / dim;
        Ok(Self {
            dimension,
            data,
            len,
        })
    }

    /// Number of vectors in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// All values in position order, `len() * dimension()` of them.
    #[must_use]
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    /// Iterates over the stored vectors in position order.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension.get())
    }

    /// Returns the `k` nearest stored vectors to `query`.
    ///
    /// Fewer than `k` results come back only when the index holds fewer than
    /// `k` vectors. An empty index always answers with an empty list.
    ///
    /// # Errors
    /// - [`VectorError::InvalidLimit`] when `k` is zero
    /// - [`VectorError::DimensionMismatch`] when `query` has the wrong length
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorError> {
        if k == 0 {
            return Err(VectorError::InvalidLimit(k));
        }
        self.dimension.validate_vector(query)?;

        if self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position: Position::new(position),
                distance: squared_euclidean(query, vector),
            })
            .collect();

        neighbors.sort_unstable_by(compare_neighbors);
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

/// Squared Euclidean distance between two equal-length vectors.
#[must_use]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .is_nan()
        .cmp(&b.distance.is_nan())
        .then_with(|| a.distance.total_cmp(&b.distance))
        .then_with(|| a.position.cmp(&b.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn dim(d: usize) -> VectorDimension {
        VectorDimension::new(d).unwrap()
    }

    fn random_vectors(rng: &mut StdRng, count: usize, d: usize) -> Vec<Vec<f32>> {
        (0..count)
            .map(|_| (0..d).map(|_| rng.random_range(-1.0f32..1.0)).collect())
            .collect()
    }

    fn positions(neighbors: &[Neighbor]) -> Vec<usize> {
        neighbors.iter().map(|n| n.position.get()).collect()
    }

    #[test]
    fn test_squared_euclidean() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_euclidean(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_build_rejects_ragged_vectors() {
        let vectors = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];

        match FlatIndex::build(dim(3), &vectors) {
            Err(VectorError::RaggedVector {
                position,
                expected,
                actual,
            }) => {
                assert_eq!(position, 2);
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected RaggedVector error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_index_returns_no_results() {
        let index = FlatIndex::build(dim(4), &[]).unwrap();
        assert!(index.is_empty());

        for k in [1, 2, 10] {
            assert!(index.query(&[0.0; 4], k).unwrap().is_empty());
        }
    }

    #[test]
    fn test_query_orders_by_distance() {
        let vectors = vec![vec![10.0, 0.0], vec![1.0, 0.0], vec![5.0, 0.0]];
        let index = FlatIndex::build(dim(2), &vectors).unwrap();

        let results = index.query(&[0.0, 0.0], 3).unwrap();
        assert_eq!(positions(&results), vec![1, 2, 0]);
        assert_eq!(results[0].distance, 1.0);
        assert_eq!(results[1].distance, 25.0);
        assert_eq!(results[2].distance, 100.0);
    }

    #[test]
    fn test_ties_break_by_position() {
        let vectors = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, -1.0],
            vec![-1.0, 0.0],
        ];
        let index = FlatIndex::build(dim(2), &vectors).unwrap();

        let results = index.query(&[0.0, 0.0], 4).unwrap();
        assert_eq!(positions(&results), vec![0, 1, 2, 3]);

        let results = index.query(&[0.0, 0.0], 2).unwrap();
        assert_eq!(positions(&results), vec![0, 1]);
    }

    #[test]
    fn test_k_larger_than_len_returns_everything() {
        let mut rng = StdRng::seed_from_u64(11);
        let vectors = random_vectors(&mut rng, 5, 8);
        let index = FlatIndex::build(dim(8), &vectors).unwrap();
        let query: Vec<f32> = random_vectors(&mut rng, 1, 8).remove(0);

        for k in [5, 6, 100] {
            let results = index.query(&query, k).unwrap();
            assert_eq!(results.len(), 5);
            assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }

    #[test]
    fn test_smaller_k_is_prefix() {
        let mut rng = StdRng::seed_from_u64(42);
        let vectors = random_vectors(&mut rng, 40, 16);
        let index = FlatIndex::build(dim(16), &vectors).unwrap();

        for _ in 0..10 {
            let query: Vec<f32> = random_vectors(&mut rng, 1, 16).remove(0);
            for k in 2..index.len() {
                let full = index.query(&query, k).unwrap();
                let shorter = index.query(&query, k - 1).unwrap();

                assert_eq!(full.len(), k);
                assert!(full.windows(2).all(|w| w[0].distance <= w[1].distance));
                assert_eq!(&full[..k - 1], shorter.as_slice());
            }
        }
    }

    #[test]
    fn test_query_matches_exhaustive_minimum() {
        let mut rng = StdRng::seed_from_u64(3);
        let vectors = random_vectors(&mut rng, 25, 6);
        let index = FlatIndex::build(dim(6), &vectors).unwrap();
        let query: Vec<f32> = random_vectors(&mut rng, 1, 6).remove(0);

        let best = index.query(&query, 1).unwrap()[0];
        let min = vectors
            .iter()
            .map(|v| squared_euclidean(&query, v))
            .fold(f32::INFINITY, f32::min);
        assert_eq!(best.distance, min);
    }

    #[test]
    fn test_query_validation() {
        let index = FlatIndex::build(dim(3), &[vec![1.0, 2.0, 3.0]]).unwrap();

        assert!(matches!(
            index.query(&[1.0, 2.0, 3.0], 0),
            Err(VectorError::InvalidLimit(0))
        ));
        assert!(matches!(
            index.query(&[1.0, 2.0], 1),
            Err(VectorError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_nan_distances_sort_last() {
        let vectors = vec![vec![f32::NAN, 0.0], vec![3.0, 0.0], vec![1.0, 0.0]];
        let index = FlatIndex::build(dim(2), &vectors).unwrap();

        let results = index.query(&[0.0, 0.0], 3).unwrap();
        assert_eq!(positions(&results), vec![2, 1, 0]);
        assert!(results[2].distance.is_nan());
    }

    #[test]
    fn test_raw_round_trip() {
        let vectors = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let index = FlatIndex::build(dim(2), &vectors).unwrap();

        let rebuilt = FlatIndex::from_raw(index.dimension(), index.as_raw().to_vec()).unwrap();
        assert_eq!(rebuilt, index);
        assert_eq!(rebuilt.iter().nth(1), Some(&[3.0, 4.0][..]));
        assert_eq!(rebuilt.len(), 3);

        assert!(FlatIndex::from_raw(dim(2), vec![1.0, 2.0, 3.0]).is_err());
    }
}
