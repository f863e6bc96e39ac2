//! Replacement policy.
//!
//! Inserts an evaluated offspring into at most `nr` subproblems whose
//! current solution it beats. Each insertion overwrites a slot; nothing is
//! ever removed, so the population size is invariant.

use super::neighborhood::Neighborhoods;
use super::population::Population;
use super::scalarize::Scalarizing;
use super::types::Solution;
use super::variation::MatingPool;
use super::weights::WeightVectors;
use rand::seq::SliceRandom;
use rand::Rng;

/// Which subproblems an offspring may replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplacementScope {
    /// Always the offspring's own neighborhood.
    Neighborhood,
    /// Always the whole population.
    Population,
    /// The pool its parents were drawn from (neighborhood with probability
    /// `delta`, otherwise the population).
    #[default]
    MatingPool,
}

/// Scalarized comparison and bounded insertion of offspring.
#[derive(Debug, Clone)]
pub struct ReplacementPolicy<'a> {
    weights: &'a WeightVectors,
    neighborhoods: &'a Neighborhoods,
    scalarizing: Scalarizing,
    scope: ReplacementScope,
    max_replacements: usize,
}

impl<'a> ReplacementPolicy<'a> {
    pub fn new(
        weights: &'a WeightVectors,
        neighborhoods: &'a Neighborhoods,
        scalarizing: Scalarizing,
        scope: ReplacementScope,
        max_replacements: usize,
    ) -> Self {
        Self {
            weights,
            neighborhoods,
            scalarizing,
            scope,
            max_replacements,
        }
    }

    /// Applies `offspring`, bred for `subproblem` from `pool`, to `population`.
    ///
    /// # Algorithm
    ///
    /// 1. Lower the ideal point with the offspring's objectives
    /// 2. Resolve the scope to a set of subproblem indices
    /// 3. Sort the indices, then shuffle them with `rng`
    /// 4. Visit in that order; replace every occupant the offspring beats
    /// 5. Stop after `max_replacements` replacements
    ///
    /// Sorting before shuffling makes the visit order depend only on the set
    /// of indices, so a full neighborhood behaves exactly like the whole
    /// population for the same random stream.
    ///
    /// Returns the number of replaced subproblems (`<= max_replacements`).
    pub fn apply<R: Rng>(
        &self,
        offspring: &Solution,
        subproblem: usize,
        pool: MatingPool,
        population: &mut Population,
        rng: &mut R,
    ) -> usize {
        population.update_ideal(offspring.objectives());

        let mut order = self.scope_indices(subproblem, pool, population.len());
        order.shuffle(rng);

        let mut replaced = 0;
        for k in order {
            if replaced >= self.max_replacements {
                break;
            }
            if self.improves(offspring, population.get(k), k, population.ideal_point()) {
                population.set(k, offspring.clone());
                replaced += 1;
            }
        }
        replaced
    }

    /// Ascending subproblem indices the offspring may replace.
    fn scope_indices(&self, subproblem: usize, pool: MatingPool, population_size: usize) -> Vec<usize> {
        let use_neighborhood = match self.scope {
            ReplacementScope::Neighborhood => true,
            ReplacementScope::Population => false,
            ReplacementScope::MatingPool => pool == MatingPool::Neighborhood,
        };
        if use_neighborhood {
            let mut indices = self.neighborhoods.get(subproblem).to_vec();
            indices.sort_unstable();
            indices
        } else {
            (0..population_size).collect()
        }
    }

    /// Whether `candidate` should take slot `k` from `occupant`.
    ///
    /// Lower constraint violation wins when either solution is infeasible;
    /// otherwise a strictly lower scalarized value is required.
    fn improves(&self, candidate: &Solution, occupant: &Solution, k: usize, ideal: &[f64]) -> bool {
        let (cv, ov) = (candidate.constraint_violation(), occupant.constraint_violation());
        if (cv > 0.0 || ov > 0.0) && cv != ov {
            return cv < ov;
        }
        let w = self.weights.get(k);
        self.scalarizing.scalarize(candidate.objectives(), w, ideal)
            < self.scalarizing.scalarize(occupant.objectives(), w, ideal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moead::error::EvaluationError;
    use crate::moead::types::MoeadProblem;
    use crate::random::create_rng;

    /// Objectives are the variables themselves.
    struct Identity;

    impl MoeadProblem for Identity {
        fn n_variables(&self) -> usize {
            2
        }
        fn n_objectives(&self) -> usize {
            2
        }
        fn lower_bound(&self, _i: usize) -> f64 {
            0.0
        }
        fn upper_bound(&self, _i: usize) -> f64 {
            10.0
        }
        fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, EvaluationError> {
            Ok(x.to_vec())
        }
    }

    fn setup(n: usize, t: usize) -> (WeightVectors, Neighborhoods, Population) {
        let weights = WeightVectors::uniform(n, 2).unwrap();
        let hood = Neighborhoods::build(&weights, t).unwrap();
        let pop = Population::initialize(&Identity, n, &mut create_rng(7)).unwrap();
        (weights, hood, pop)
    }

    fn dominant() -> Solution {
        Solution::new(vec![0.0, 0.0], vec![0.0, 0.0], 0.0)
    }

    #[test]
    fn test_replacement_cap() {
        let (weights, hood, mut pop) = setup(20, 10);
        let mut rng = create_rng(1);
        for nr in 1..=4 {
            let policy = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Population, nr);
            let replaced = policy.apply(&dominant(), 5, MatingPool::Population, &mut pop, &mut rng);
            // (0,0) is at the ideal point: it beats every occupant not already equal to it
            assert!(replaced <= nr);
            assert_eq!(pop.len(), 20);
        }
    }

    #[test]
    fn test_dominant_offspring_fills_cap() {
        let (weights, hood, mut pop) = setup(20, 10);
        let policy = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Neighborhood, 3);
        let replaced = policy.apply(&dominant(), 5, MatingPool::Population, &mut pop, &mut create_rng(1));
        assert_eq!(replaced, 3);

        let copies: Vec<usize> = (0..20).filter(|&k| pop.get(k) == &dominant()).collect();
        assert_eq!(copies.len(), 3);
        assert!(copies.iter().all(|k| hood.get(5).contains(k)));
    }

    #[test]
    fn test_ideal_updated_before_comparison() {
        let (weights, hood, mut pop) = setup(10, 3);
        let policy = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Neighborhood, 2);
        policy.apply(&dominant(), 0, MatingPool::Neighborhood, &mut pop, &mut create_rng(2));
        assert_eq!(pop.ideal_point(), &[0.0, 0.0]);
    }

    #[test]
    fn test_worse_offspring_replaces_nothing() {
        let (weights, hood, mut pop) = setup(10, 10);
        let before: Vec<Solution> = pop.solutions().to_vec();
        let worst = Solution::new(vec![10.0, 10.0], vec![10.0, 10.0], 0.0);
        let policy = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Population, 10);
        let replaced = policy.apply(&worst, 0, MatingPool::Population, &mut pop, &mut create_rng(3));
        assert_eq!(replaced, 0);
        assert_eq!(pop.solutions(), &before[..]);
    }

    #[test]
    fn test_mating_pool_scope_follows_pool() {
        let (weights, hood, _) = setup(20, 4);
        let policy = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::MatingPool, 2);
        let local = policy.scope_indices(10, MatingPool::Neighborhood, 20);
        let global = policy.scope_indices(10, MatingPool::Population, 20);
        assert_eq!(local.len(), 4);
        assert!(local.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(global, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_full_neighborhood_scope_equals_population_scope() {
        let (weights, hood, _) = setup(15, 15);
        let local = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Neighborhood, 2);
        let global = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Population, 2);
        for k in 0..15 {
            assert_eq!(
                local.scope_indices(k, MatingPool::Neighborhood, 15),
                global.scope_indices(k, MatingPool::Neighborhood, 15)
            );
        }
    }

    #[test]
    fn test_feasible_beats_infeasible() {
        let (weights, hood, _) = setup(5, 2);
        let policy = ReplacementPolicy::new(&weights, &hood, Scalarizing::Tchebycheff, ReplacementScope::Population, 1);
        let feasible_bad = Solution::new(vec![9.0, 9.0], vec![9.0, 9.0], 0.0);
        let infeasible_good = Solution::new(vec![0.0, 0.0], vec![0.0, 0.0], 1.5);
        let ideal = [0.0, 0.0];
        assert!(policy.improves(&feasible_bad, &infeasible_good, 2, &ideal));
        assert!(!policy.improves(&infeasible_good, &feasible_bad, 2, &ideal));
    }
}
