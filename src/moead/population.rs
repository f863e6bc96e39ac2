//! Population store.
//!
//! Holds exactly one [`Solution`] per subproblem, the running ideal point,
//! and the run's evaluation counter. All objective evaluations go through
//! this type so the counter cannot be bypassed.

use super::error::MoeadError;
use super::types::{MoeadProblem, Solution};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One solution per subproblem plus the ideal point.
#[derive(Debug, Clone)]
pub struct Population {
    solutions: Vec<Solution>,
    ideal: Vec<f64>,
    evaluations: usize,
}

impl Population {
    /// Creates and evaluates `size` random solutions.
    ///
    /// The evaluation counter ends at `size`; the ideal point is the
    /// component-wise minimum over the initial objectives.
    ///
    /// # Errors
    ///
    /// Propagates the first evaluation failure, or a bounds violation if
    /// [`MoeadProblem::create_variables`] produced out-of-range values.
    pub fn initialize<P: MoeadProblem, R: Rng>(
        problem: &P,
        size: usize,
        rng: &mut R,
    ) -> Result<Self, MoeadError> {
        let mut population = Self {
            solutions: Vec::with_capacity(size),
            ideal: vec![f64::INFINITY; problem.n_objectives()],
            evaluations: 0,
        };

        for i in 0..size {
            let variables = problem.create_variables(rng);
            let solution = population.evaluate(problem, i, variables)?;
            population.update_ideal(solution.objectives());
            population.solutions.push(solution);
        }

        Ok(population)
    }

    /// Evaluates `variables` on behalf of `subproblem`.
    ///
    /// Increments the evaluation counter by one. Does not touch the ideal
    /// point or the stored solutions.
    pub(crate) fn evaluate<P: MoeadProblem>(
        &mut self,
        problem: &P,
        subproblem: usize,
        variables: Vec<f64>,
    ) -> Result<Solution, MoeadError> {
        self.evaluations += 1;
        evaluate_one(problem, subproblem, variables)
    }

    /// Evaluates a batch of `(subproblem, variables)` pairs.
    ///
    /// With `parallel` and the `parallel` feature enabled the objective
    /// function runs on the rayon pool; results keep the input order.
    /// The counter grows by the number of evaluations actually started,
    /// which is less than the batch length when one fails.
    pub(crate) fn evaluate_batch<P: MoeadProblem>(
        &mut self,
        problem: &P,
        batch: Vec<(usize, Vec<f64>)>,
        parallel: bool,
    ) -> Result<Vec<(usize, Solution)>, MoeadError> {
        let started = AtomicUsize::new(0);
        let evaluate = |(k, vars): (usize, Vec<f64>)| {
            started.fetch_add(1, Ordering::Relaxed);
            evaluate_one(problem, k, vars).map(|s| (k, s))
        };

        #[cfg(feature = "parallel")]
        let result: Result<Vec<_>, _> = if parallel {
            batch.into_par_iter().map(evaluate).collect()
        } else {
            batch.into_iter().map(evaluate).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let result: Result<Vec<_>, _> = {
            let _ = parallel;
            batch.into_iter().map(evaluate).collect()
        };

        self.evaluations += started.into_inner();
        result
    }

    /// Lowers ideal-point components beaten by `objectives`.
    ///
    /// Returns `true` if any component changed. Components never increase.
    pub fn update_ideal(&mut self, objectives: &[f64]) -> bool {
        let mut improved = false;
        for (z, &f) in self.ideal.iter_mut().zip(objectives) {
            if f < *z {
                *z = f;
                improved = true;
            }
        }
        improved
    }

    /// Current solution of subproblem `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> &Solution {
        &self.solutions[index]
    }

    /// Replaces the solution of subproblem `index`, returning the old one.
    ///
    /// The only way to change a slot; cardinality never changes.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, solution: Solution) -> Solution {
        std::mem::replace(&mut self.solutions[index], solution)
    }

    /// Number of subproblems.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Solutions in subproblem order.
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    /// Best value seen so far for each objective.
    pub fn ideal_point(&self) -> &[f64] {
        &self.ideal
    }

    /// Objective evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}

/// Checks bounds, evaluates, and wraps the result into a [`Solution`].
fn evaluate_one<P: MoeadProblem>(
    problem: &P,
    subproblem: usize,
    variables: Vec<f64>,
) -> Result<Solution, MoeadError> {
    let expected = problem.n_variables();
    if variables.len() != expected {
        return Err(MoeadError::VariableCount {
            subproblem,
            expected,
            actual: variables.len(),
        });
    }
    check_bounds(problem, &variables)?;

    let objectives = problem
        .evaluate(&variables)
        .map_err(|source| MoeadError::Evaluation { subproblem, source })?;

    let n_objectives = problem.n_objectives();
    if objectives.len() != n_objectives {
        return Err(MoeadError::ObjectiveCount {
            subproblem,
            expected: n_objectives,
            actual: objectives.len(),
        });
    }

    let violation = problem.constraint_violation(&variables);
    Ok(Solution::new(variables, objectives, violation))
}

fn check_bounds<P: MoeadProblem>(problem: &P, variables: &[f64]) -> Result<(), MoeadError> {
    for (i, &value) in variables.iter().enumerate() {
        let (lower, upper) = (problem.lower_bound(i), problem.upper_bound(i));
        if !(lower..=upper).contains(&value) {
            return Err(MoeadError::BoundsViolation {
                variable: i,
                value,
                lower,
                upper,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moead::error::EvaluationError;
    use crate::random::create_rng;

    struct Square;

    impl MoeadProblem for Square {
        fn n_variables(&self) -> usize {
            2
        }
        fn n_objectives(&self) -> usize {
            2
        }
        fn lower_bound(&self, _i: usize) -> f64 {
            -1.0
        }
        fn upper_bound(&self, _i: usize) -> f64 {
            1.0
        }
        fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, EvaluationError> {
            Ok(vec![x[0] * x[0], (x[1] - 1.0) * (x[1] - 1.0)])
        }
    }

    struct Failing;

    impl MoeadProblem for Failing {
        fn n_variables(&self) -> usize {
            1
        }
        fn n_objectives(&self) -> usize {
            2
        }
        fn lower_bound(&self, _i: usize) -> f64 {
            0.0
        }
        fn upper_bound(&self, _i: usize) -> f64 {
            1.0
        }
        fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, EvaluationError> {
            if x[0] > 0.5 {
                Err(EvaluationError::new("simulator diverged"))
            } else {
                Ok(vec![x[0], 1.0 - x[0]])
            }
        }
    }

    #[test]
    fn test_initialize_counts_and_ideal() {
        let mut rng = create_rng(3);
        let pop = Population::initialize(&Square, 30, &mut rng).unwrap();

        assert_eq!(pop.len(), 30);
        assert_eq!(pop.evaluations(), 30);

        for j in 0..2 {
            let min = pop
                .iter()
                .map(|s| s.objectives()[j])
                .fold(f64::INFINITY, f64::min);
            assert_eq!(pop.ideal_point()[j], min);
        }
        for s in pop.iter() {
            assert!(s.variables().iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_set_keeps_cardinality() {
        let mut rng = create_rng(3);
        let mut pop = Population::initialize(&Square, 5, &mut rng).unwrap();
        let replacement = pop.get(4).clone();
        let old = pop.set(0, replacement.clone());
        assert_eq!(pop.len(), 5);
        assert_eq!(pop.get(0), &replacement);
        assert_ne!(&old, pop.get(0));
    }

    #[test]
    fn test_update_ideal_monotone() {
        let mut rng = create_rng(3);
        let mut pop = Population::initialize(&Square, 5, &mut rng).unwrap();
        let before = pop.ideal_point().to_vec();

        assert!(!pop.update_ideal(&[f64::MAX, f64::MAX]));
        assert_eq!(pop.ideal_point(), &before[..]);

        assert!(pop.update_ideal(&[-1.0, f64::MAX]));
        assert_eq!(pop.ideal_point()[0], -1.0);
        assert_eq!(pop.ideal_point()[1], before[1]);
    }

    #[test]
    fn test_bounds_violation_detected() {
        let mut rng = create_rng(3);
        let mut pop = Population::initialize(&Square, 2, &mut rng).unwrap();
        let err = pop.evaluate(&Square, 0, vec![0.0, 1.5]).unwrap_err();
        assert!(matches!(err, MoeadError::BoundsViolation { variable: 1, .. }));
    }

    #[test]
    fn test_evaluation_error_propagates() {
        let mut rng = create_rng(11);
        let err = Population::initialize(&Failing, 50, &mut rng).unwrap_err();
        match err {
            MoeadError::Evaluation { source, .. } => {
                assert_eq!(source.message(), "simulator diverged");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_variable_count_mismatch_detected() {
        let mut rng = create_rng(3);
        let mut pop = Population::initialize(&Square, 2, &mut rng).unwrap();
        let err = pop.evaluate(&Square, 1, vec![0.0, 0.5, 0.5]).unwrap_err();
        assert!(matches!(
            err,
            MoeadError::VariableCount {
                subproblem: 1,
                expected: 2,
                actual: 3
            }
        ));
        let err = pop.evaluate(&Square, 1, vec![0.0]).unwrap_err();
        assert!(matches!(err, MoeadError::VariableCount { actual: 1, .. }));
    }

    #[test]
    fn test_failed_batch_counts_started_evaluations() {
        let mut rng = create_rng(3);
        let mut pop = Population::initialize(&Failing, 0, &mut rng).unwrap();
        let batch = vec![(0, vec![0.1]), (1, vec![0.2]), (2, vec![0.9]), (3, vec![0.3]), (4, vec![0.4])];
        assert!(pop.evaluate_batch(&Failing, batch, false).is_err());
        assert_eq!(pop.evaluations(), 3);
    }

    #[test]
    fn test_evaluate_batch_preserves_order() {
        let mut rng = create_rng(3);
        let mut pop = Population::initialize(&Square, 4, &mut rng).unwrap();
        let batch = vec![(2, vec![0.5, 0.0]), (0, vec![0.0, 0.5]), (1, vec![1.0, 1.0])];
        let out = pop.evaluate_batch(&Square, batch, true).unwrap();

        assert_eq!(pop.evaluations(), 7);
        let order: Vec<usize> = out.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert_eq!(out[0].1.objectives(), &[0.25, 1.0]);
    }
}
