//! Real-valued variation operators.
//!
//! Crossover and mutation for bounded `f64` decision vectors. Every
//! operator clamps its output into `[lower, upper]` per dimension, so
//! offspring never leave the box.
//!
//! # Crossover Operators
//!
//! - [`Crossover::DifferentialEvolution`]: DE/rand/1/bin around the current
//!   subproblem's solution (Li & Zhang, 2009)
//! - [`Crossover::Sbx`]: simulated binary crossover (Deb & Agrawal, 1995)
//! - [`Crossover::BlxAlpha`]: blend crossover (Eshelman & Schaffer, 1993)
//!
//! # Mutation Operators
//!
//! - [`Mutation::Polynomial`]: polynomial mutation (Deb & Goyal, 1996)
//!
//! # References
//!
//! - Li & Zhang (2009), "Multiobjective Optimization Problems With
//!   Complicated Pareto Sets, MOEA/D and NSGA-II", *IEEE TEVC* 13(2)
//! - Deb & Agrawal (1995), "Simulated Binary Crossover for Continuous
//!   Search Space", *Complex Systems* 9
//! - Eshelman & Schaffer (1993), "Real-Coded Genetic Algorithms and
//!   Interval-Schemata"

use super::error::ConfigError;
use super::types::MoeadProblem;
use rand::Rng;

/// Per-dimension box constraints of the decision space.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Builds bounds from explicit vectors.
    ///
    /// # Errors
    /// Fails if lengths differ, any bound is non-finite, or `lower > upper`.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, ConfigError> {
        if lower.len() != upper.len() {
            return Err(ConfigError::Problem(format!(
                "{} lower bounds but {} upper bounds",
                lower.len(),
                upper.len()
            )));
        }
        if lower.is_empty() {
            return Err(ConfigError::Problem("at least one variable is required".into()));
        }
        for (i, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(ConfigError::Problem(format!(
                    "variable {i} has invalid bounds [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Reads the bounds of every variable of `problem`.
    pub fn from_problem<P: MoeadProblem>(problem: &P) -> Result<Self, ConfigError> {
        let n = problem.n_variables();
        Self::new(
            (0..n).map(|i| problem.lower_bound(i)).collect(),
            (0..n).map(|i| problem.upper_bound(i)).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn lower(&self, i: usize) -> f64 {
        self.lower[i]
    }

    pub fn upper(&self, i: usize) -> f64 {
        self.upper[i]
    }

    /// Clamps `value` into the range of variable `i`.
    pub fn clamp(&self, i: usize, value: f64) -> f64 {
        value.clamp(self.lower[i], self.upper[i])
    }

    pub fn contains(&self, variables: &[f64]) -> bool {
        variables
            .iter()
            .enumerate()
            .all(|(i, v)| (self.lower[i]..=self.upper[i]).contains(v))
    }
}

// ============================================================================
// Crossover
// ============================================================================

/// Recombination operator producing one offspring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// DE/rand/1/bin: `y_j = x_j + F·(a_j − b_j)` where `x` is the current
    /// solution of the subproblem being updated.
    DifferentialEvolution {
        /// Crossover rate CR in `[0, 1]`.
        cr: f64,
        /// Scaling factor F.
        f: f64,
    },
    /// Simulated binary crossover.
    Sbx {
        /// Probability of recombining at all.
        probability: f64,
        /// Distribution index η_c; larger values keep children closer to parents.
        distribution_index: f64,
    },
    /// Blend crossover BLX-α.
    BlxAlpha {
        /// Probability of recombining at all.
        probability: f64,
        /// Extension of the parents' interval on each side, as a fraction.
        alpha: f64,
    },
}

impl Default for Crossover {
    fn default() -> Self {
        Crossover::DifferentialEvolution { cr: 1.0, f: 0.5 }
    }
}

impl Crossover {
    /// Number of distinct mating parents the operator needs.
    pub fn arity(&self) -> usize {
        2
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Crossover::DifferentialEvolution { cr, f } => {
                check_probability("crossover.cr", cr)?;
                if !f.is_finite() || f < 0.0 {
                    return Err(ConfigError::invalid("crossover.f", format!("must be >= 0, got {f}")));
                }
            }
            Crossover::Sbx {
                probability,
                distribution_index,
            } => {
                check_probability("crossover.probability", probability)?;
                check_distribution_index("crossover.distribution_index", distribution_index)?;
            }
            Crossover::BlxAlpha { probability, alpha } => {
                check_probability("crossover.probability", probability)?;
                if !alpha.is_finite() || alpha < 0.0 {
                    return Err(ConfigError::invalid(
                        "crossover.alpha",
                        format!("must be >= 0, got {alpha}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Produces one offspring.
    ///
    /// `current` is the solution of the subproblem being updated; `parents`
    /// holds [`arity`](Self::arity) mating parents.
    ///
    /// # Panics
    /// Panics if fewer than `arity()` parents are given.
    pub fn apply<R: Rng>(
        &self,
        current: &[f64],
        parents: &[&[f64]],
        bounds: &Bounds,
        rng: &mut R,
    ) -> Vec<f64> {
        assert!(parents.len() >= self.arity(), "crossover needs {} parents", self.arity());
        match *self {
            Crossover::DifferentialEvolution { cr, f } => {
                de_rand_1_bin(current, parents[0], parents[1], cr, f, bounds, rng)
            }
            Crossover::Sbx {
                probability,
                distribution_index,
            } => sbx(parents[0], parents[1], probability, distribution_index, bounds, rng),
            Crossover::BlxAlpha { probability, alpha } => {
                blx_alpha(parents[0], parents[1], probability, alpha, bounds, rng)
            }
        }
    }
}

/// DE/rand/1/bin.
///
/// # Algorithm
///
/// 1. Pick `j_rand` uniformly; that component always mutates
/// 2. For each other `j`, mutate with probability `cr`
/// 3. A mutated component is `x_j + f·(a_j − b_j)`, clamped
fn de_rand_1_bin<R: Rng>(
    current: &[f64],
    a: &[f64],
    b: &[f64],
    cr: f64,
    f: f64,
    bounds: &Bounds,
    rng: &mut R,
) -> Vec<f64> {
    let n = current.len();
    let j_rand = rng.random_range(0..n);
    (0..n)
        .map(|j| {
            if j == j_rand || rng.random::<f64>() < cr {
                bounds.clamp(j, current[j] + f * (a[j] - b[j]))
            } else {
                current[j]
            }
        })
        .collect()
}

/// Smallest parent gap SBX treats as distinct.
const SBX_EPS: f64 = 1.0e-14;

/// Simulated binary crossover, bounded variant. Returns one of the two
/// children, chosen per variable at random.
fn sbx<R: Rng>(
    p1: &[f64],
    p2: &[f64],
    probability: f64,
    eta: f64,
    bounds: &Bounds,
    rng: &mut R,
) -> Vec<f64> {
    if rng.random::<f64>() > probability {
        return p1.to_vec();
    }

    let exponent = 1.0 / (eta + 1.0);
    let spread = |beta: f64, u: f64| {
        let alpha = 2.0 - beta.powf(-(eta + 1.0));
        if u <= 1.0 / alpha {
            (u * alpha).powf(exponent)
        } else {
            (1.0 / (2.0 - u * alpha)).powf(exponent)
        }
    };

    (0..p1.len())
        .map(|i| {
            if rng.random::<f64>() > 0.5 || (p1[i] - p2[i]).abs() <= SBX_EPS {
                return p1[i];
            }
            let (y1, y2) = if p1[i] < p2[i] { (p1[i], p2[i]) } else { (p2[i], p1[i]) };
            let (yl, yu) = (bounds.lower(i), bounds.upper(i));
            let u: f64 = rng.random();

            let beta_q = spread(1.0 + 2.0 * (y1 - yl) / (y2 - y1), u);
            let c1 = 0.5 * ((y1 + y2) - beta_q * (y2 - y1));

            let beta_q = spread(1.0 + 2.0 * (yu - y2) / (y2 - y1), u);
            let c2 = 0.5 * ((y1 + y2) + beta_q * (y2 - y1));

            let child = if rng.random::<f64>() <= 0.5 { c2 } else { c1 };
            bounds.clamp(i, child)
        })
        .collect()
}

/// BLX-α: each component uniform in the parents' interval extended by
/// `alpha` times its width on both sides.
fn blx_alpha<R: Rng>(
    p1: &[f64],
    p2: &[f64],
    probability: f64,
    alpha: f64,
    bounds: &Bounds,
    rng: &mut R,
) -> Vec<f64> {
    if rng.random::<f64>() > probability {
        return p1.to_vec();
    }
    p1.iter()
        .zip(p2)
        .enumerate()
        .map(|(i, (&a, &b))| {
            let (lo, hi) = (a.min(b), a.max(b));
            let range = hi - lo;
            if range <= 0.0 {
                return lo;
            }
            bounds.clamp(i, rng.random_range((lo - alpha * range)..=(hi + alpha * range)))
        })
        .collect()
}

// ============================================================================
// Mutation
// ============================================================================

/// Per-variable perturbation applied to each offspring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Polynomial mutation.
    Polynomial {
        /// Per-variable mutation probability. `None` means `1 / n_variables`.
        probability: Option<f64>,
        /// Distribution index η_m; larger values give smaller perturbations.
        distribution_index: f64,
    },
    /// No mutation.
    Disabled,
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::Polynomial {
            probability: None,
            distribution_index: 20.0,
        }
    }
}

impl Mutation {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Mutation::Polynomial {
            probability,
            distribution_index,
        } = *self
        {
            if let Some(p) = probability {
                check_probability("mutation.probability", p)?;
            }
            check_distribution_index("mutation.distribution_index", distribution_index)?;
        }
        Ok(())
    }

    /// Mutates `variables` in place; results stay within `bounds`.
    pub fn apply<R: Rng>(&self, variables: &mut [f64], bounds: &Bounds, rng: &mut R) {
        match *self {
            Mutation::Polynomial {
                probability,
                distribution_index,
            } => {
                let p = probability.unwrap_or(1.0 / variables.len().max(1) as f64);
                polynomial_mutation(variables, p, distribution_index, bounds, rng);
            }
            Mutation::Disabled => {}
        }
    }
}

/// Polynomial mutation.
///
/// # Algorithm (Deb & Goyal, 1996)
///
/// For each variable, with probability `probability`:
/// 1. Normalize the distances to both bounds: `δ₁ = (y − l)/(u − l)`,
///    `δ₂ = (u − y)/(u − l)`
/// 2. Draw `r ∈ [0, 1)`; if `r ≤ 0.5` move toward the lower bound, else
///    toward the upper bound, with a step distributed by η
/// 3. Clamp to `[l, u]`
fn polynomial_mutation<R: Rng>(
    variables: &mut [f64],
    probability: f64,
    eta: f64,
    bounds: &Bounds,
    rng: &mut R,
) {
    let exponent = 1.0 / (eta + 1.0);
    for (i, y) in variables.iter_mut().enumerate() {
        if rng.random::<f64>() > probability {
            continue;
        }
        let (yl, yu) = (bounds.lower(i), bounds.upper(i));
        if yu <= yl {
            *y = yl;
            continue;
        }

        let delta1 = (*y - yl) / (yu - yl);
        let delta2 = (yu - *y) / (yu - yl);
        let r: f64 = rng.random();

        let delta_q = if r <= 0.5 {
            let xy = 1.0 - delta1;
            let val = 2.0 * r + (1.0 - 2.0 * r) * xy.powf(eta + 1.0);
            val.powf(exponent) - 1.0
        } else {
            let xy = 1.0 - delta2;
            let val = 2.0 * (1.0 - r) + 2.0 * (r - 0.5) * xy.powf(eta + 1.0);
            1.0 - val.powf(exponent)
        };

        *y = bounds.clamp(i, *y + delta_q * (yu - yl));
    }
}

fn check_probability(name: &'static str, p: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::invalid(name, format!("must be in [0, 1], got {p}")));
    }
    Ok(())
}

fn check_distribution_index(name: &'static str, eta: f64) -> Result<(), ConfigError> {
    if !eta.is_finite() || eta < 0.0 {
        return Err(ConfigError::invalid(name, format!("must be >= 0, got {eta}")));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
