//! Problem contract and the evaluated solution type.
//!
//! [`MoeadProblem`] is the only trait users implement. The engine owns
//! everything else: weight vectors, neighborhoods, the population, and the
//! ideal point.

use super::error::EvaluationError;
use super::termination::AlgorithmStatus;
use rand::Rng;

/// A bounded, real-valued, multi-objective minimization problem.
///
/// All objectives are **minimized**. Negate an objective to maximize it.
///
/// # Examples
///
/// ```
/// use u_moead::moead::{EvaluationError, MoeadProblem};
///
/// /// f1(x) = x, f2(x) = 1 - sqrt(x) on [0, 1].
/// struct Convex;
///
/// impl MoeadProblem for Convex {
///     fn n_variables(&self) -> usize { 1 }
///     fn n_objectives(&self) -> usize { 2 }
///     fn lower_bound(&self, _i: usize) -> f64 { 0.0 }
///     fn upper_bound(&self, _i: usize) -> f64 { 1.0 }
///
///     fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, EvaluationError> {
///         Ok(vec![x[0], 1.0 - x[0].sqrt()])
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// `MoeadProblem` must be `Send + Sync` because the runner may evaluate a
/// generation's offspring in parallel (feature `parallel`).
pub trait MoeadProblem: Send + Sync {
    /// Number of decision variables.
    fn n_variables(&self) -> usize;

    /// Number of objectives. Must be at least 2.
    fn n_objectives(&self) -> usize;

    /// Lower bound of variable `i`.
    fn lower_bound(&self, i: usize) -> f64;

    /// Upper bound of variable `i`.
    fn upper_bound(&self, i: usize) -> f64;

    /// Creates random decision variables for an initial solution.
    ///
    /// The default draws each variable uniformly within its bounds.
    /// Overrides must stay within bounds; the engine checks.
    fn create_variables<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.n_variables())
            .map(|i| {
                let (lo, hi) = (self.lower_bound(i), self.upper_bound(i));
                if hi > lo {
                    rng.random_range(lo..=hi)
                } else {
                    lo
                }
            })
            .collect()
    }

    /// Computes the objective vector for `variables`.
    ///
    /// Must return exactly [`n_objectives`](Self::n_objectives) values.
    /// Errors abort the run; they are never retried.
    fn evaluate(&self, variables: &[f64]) -> Result<Vec<f64>, EvaluationError>;

    /// Total constraint violation of `variables`. `0.0` means feasible.
    ///
    /// The default declares the problem unconstrained.
    fn constraint_violation(&self, _variables: &[f64]) -> f64 {
        0.0
    }

    /// Called after every completed generation.
    ///
    /// Useful for progress reporting. The default is a no-op.
    fn on_generation(&self, _status: &AlgorithmStatus) {}
}

/// An evaluated candidate solution.
///
/// Solutions are created by the engine only after their objectives have
/// been computed, so the objective vector is always present and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    variables: Vec<f64>,
    objectives: Vec<f64>,
    constraint_violation: f64,
}

impl Solution {
    pub(crate) fn new(variables: Vec<f64>, objectives: Vec<f64>, constraint_violation: f64) -> Self {
        Self {
            variables,
            objectives,
            constraint_violation,
        }
    }

    /// Decision variable values.
    pub fn variables(&self) -> &[f64] {
        &self.variables
    }

    /// Objective values.
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// Total constraint violation (`0.0` when feasible).
    pub fn constraint_violation(&self) -> f64 {
        self.constraint_violation
    }

    /// Whether the solution satisfies every constraint.
    pub fn is_feasible(&self) -> bool {
        self.constraint_violation <= 0.0
    }
}
