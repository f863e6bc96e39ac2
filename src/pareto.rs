//! Pareto dominance utilities.
//!
//! The optimizer returns one solution per subproblem. Callers usually
//! want only the mutually non-dominated ones; [`non_dominated_indices`]
//! extracts them. All objectives are **minimized**.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//!   (constrained-domination, §VI)

use std::cmp::Ordering;

/// Dominance relation between two objective vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other (includes equal vectors).
    Neither,
}

/// Compares two objective vectors for Pareto dominance.
///
/// # Example
///
/// ```
/// use u_moead::pareto::{compare, Dominance};
///
/// assert_eq!(compare(&[1.0, 2.0], &[2.0, 2.0]), Dominance::Left);
/// assert_eq!(compare(&[1.0, 3.0], &[2.0, 2.0]), Dominance::Neither);
/// assert_eq!(compare(&[1.0, 1.0], &[1.0, 1.0]), Dominance::Neither);
/// ```
pub fn compare(a: &[f64], b: &[f64]) -> Dominance {
    debug_assert_eq!(a.len(), b.len(), "objective vectors must have the same length");

    let mut a_better = false;
    let mut b_better = false;
    for (&va, &vb) in a.iter().zip(b) {
        match va.partial_cmp(&vb) {
            Some(Ordering::Less) => a_better = true,
            Some(Ordering::Greater) => b_better = true,
            _ => {}
        }
        if a_better && b_better {
            return Dominance::Neither;
        }
    }

    match (a_better, b_better) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Whether `a` Pareto-dominates `b`.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    compare(a, b) == Dominance::Left
}

/// Indices of the vectors not dominated by any other vector.
///
/// Identical vectors do not dominate each other, so duplicates are all
/// kept. Order follows the input.
///
/// # Complexity
///
/// O(m · n²)
///
/// # Example
///
/// ```
/// use u_moead::pareto::non_dominated_indices;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
///     vec![4.0, 4.0], // dominated by [3, 3]
/// ];
/// assert_eq!(non_dominated_indices(&objectives), vec![0, 1, 2]);
/// ```
pub fn non_dominated_indices<V: AsRef<[f64]>>(objectives: &[V]) -> Vec<usize> {
    (0..objectives.len())
        .filter(|&i| {
            !objectives
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other.as_ref(), objectives[i].as_ref()))
        })
        .collect()
}

/// Like [`non_dominated_indices`], but with constrained domination:
/// a feasible vector dominates every infeasible one, and between two
/// infeasible vectors the smaller violation dominates.
pub fn non_dominated_indices_constrained<V: AsRef<[f64]>>(objectives: &[V], violations: &[f64]) -> Vec<usize> {
    assert_eq!(objectives.len(), violations.len(), "one violation per objective vector");

    let c_dominates = |a: usize, b: usize| {
        let (va, vb) = (violations[a], violations[b]);
        if va > 0.0 || vb > 0.0 {
            va < vb
        } else {
            dominates(objectives[a].as_ref(), objectives[b].as_ref())
        }
    };

    (0..objectives.len())
        .filter(|&i| !(0..objectives.len()).any(|j| j != i && c_dominates(j, i)))
        .collect()
}
