//! Scalarizing functions.
//!
//! Reduce an objective vector to one number for a given subproblem.
//! Lower is better.
//!
//! | Variant | Formula | Notes |
//! |---------|---------|-------|
//! | [`Tchebycheff`](Scalarizing::Tchebycheff) (default) | `max wᵢ·\|fᵢ − zᵢ\|` | handles non-convex fronts |
//! | [`WeightedSum`](Scalarizing::WeightedSum) | `Σ wᵢ·fᵢ` | convex fronts only |
//! | [`Pbi`](Scalarizing::Pbi) | `d₁ + θ·d₂` | explicit convergence/diversity trade-off |

/// Weight substituted for zero components in the Tchebycheff function.
///
/// A zero weight would make the function blind to that objective, so
/// weakly dominated extremes would tie with the solutions dominating them.
pub const TCHEBYCHEFF_EPSILON: f64 = 1e-4;

/// Decomposition approach used to compare solutions within a subproblem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalarizing {
    /// `Σ wᵢ·fᵢ`. Ignores the ideal point.
    WeightedSum,
    /// `max wᵢ·|fᵢ − zᵢ|`, zero weights replaced by [`TCHEBYCHEFF_EPSILON`].
    #[default]
    Tchebycheff,
    /// Penalty-based boundary intersection.
    Pbi {
        /// Penalty on the distance from the weight direction (commonly 5.0).
        theta: f64,
    },
}

impl Scalarizing {
    /// Scalarizes `objectives` for the subproblem with weight vector `weights`.
    ///
    /// Deterministic and free of side effects.
    ///
    /// # Example
    ///
    /// ```
    /// use u_moead::moead::Scalarizing;
    ///
    /// let f = [3.0, 2.0];
    /// let w = [0.5, 0.5];
    /// let z = [1.0, 1.0];
    /// assert_eq!(Scalarizing::Tchebycheff.scalarize(&f, &w, &z), 1.0);
    /// assert_eq!(Scalarizing::WeightedSum.scalarize(&f, &w, &z), 2.5);
    /// ```
    pub fn scalarize(&self, objectives: &[f64], weights: &[f64], ideal: &[f64]) -> f64 {
        debug_assert_eq!(objectives.len(), weights.len());
        debug_assert_eq!(objectives.len(), ideal.len());

        match *self {
            Scalarizing::WeightedSum => objectives.iter().zip(weights).map(|(f, w)| w * f).sum(),
            Scalarizing::Tchebycheff => objectives
                .iter()
                .zip(weights)
                .zip(ideal)
                .map(|((&f, &w), &z)| {
                    let w = if w <= 0.0 { TCHEBYCHEFF_EPSILON } else { w };
                    w * (f - z).abs()
                })
                .fold(f64::NEG_INFINITY, f64::max),
            Scalarizing::Pbi { theta } => pbi(objectives, weights, ideal, theta),
        }
    }
}

fn pbi(objectives: &[f64], weights: &[f64], ideal: &[f64], theta: f64) -> f64 {
    let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm <= 0.0 {
        return f64::INFINITY;
    }

    // d1: length of the projection of (f - z) onto the weight direction
    let d1: f64 = objectives
        .iter()
        .zip(weights)
        .zip(ideal)
        .map(|((f, w), z)| (f - z) * w / norm)
        .sum();

    // d2: distance from (f - z) to that projection
    let d2 = objectives
        .iter()
        .zip(weights)
        .zip(ideal)
        .map(|((f, w), z)| {
            let r = (f - z) - d1 * w / norm;
            r * r
        })
        .sum::<f64>()
        .sqrt();

    d1 + theta * d2
}
