//! Weight-space neighborhoods.
//!
//! For every subproblem `i`, the `T` subproblems whose weight vectors are
//! closest to `w_i` in Euclidean distance. Distances are sorted with a
//! stable sort, so equal distances keep ascending index order. Weight
//! vectors are pairwise distinct, so `i` itself is the unique entry at
//! distance 0 and always comes first.

use super::error::ConfigError;
use super::weights::WeightVectors;

/// Precomputed `T`-nearest neighborhoods, one row per subproblem.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighborhoods {
    size: usize,
    rows: Vec<Vec<usize>>,
}

impl Neighborhoods {
    /// Builds the neighborhood of every weight vector.
    ///
    /// # Complexity
    /// O(N² · m + N² log N)
    ///
    /// # Errors
    ///
    /// [`ConfigError::NeighborhoodTooLarge`] if `size > weights.len()`,
    /// [`ConfigError::InvalidParameter`] if `size == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use u_moead::moead::{Neighborhoods, WeightVectors};
    ///
    /// let weights = WeightVectors::uniform(5, 2).unwrap();
    /// let hood = Neighborhoods::build(&weights, 3).unwrap();
    /// assert_eq!(hood.get(0), &[0, 1, 2]);
    /// assert_eq!(hood.get(2), &[2, 1, 3]);
    /// ```
    pub fn build(weights: &WeightVectors, size: usize) -> Result<Self, ConfigError> {
        let n = weights.len();
        if size == 0 {
            return Err(ConfigError::invalid("neighborhood_size", "must be at least 1"));
        }
        if size > n {
            return Err(ConfigError::NeighborhoodTooLarge {
                neighborhood_size: size,
                population_size: n,
            });
        }

        let rows = weights
            .iter()
            .map(|wi| {
                let mut by_distance: Vec<(usize, f64)> = weights
                    .iter()
                    .enumerate()
                    .map(|(j, wj)| (j, euclidean(wi, wj)))
                    .collect();
                // sort_by is stable: ties stay in index order
                by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
                by_distance.into_iter().take(size).map(|(j, _)| j).collect()
            })
            .collect();

        Ok(Self { size, rows })
    }

    /// Neighborhood size `T`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of subproblems.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Neighbors of subproblem `i`, nearest first (`i` itself at position 0).
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    pub fn get(&self, i: usize) -> &[usize] {
        &self.rows[i]
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
