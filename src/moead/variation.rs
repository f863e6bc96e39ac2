//! Variation pipeline: mating selection → crossover → mutation.
//!
//! Produces exactly one offspring per call and never touches shared state;
//! the caller evaluates the offspring and hands it to replacement.

use super::neighborhood::Neighborhoods;
use super::operators::{Bounds, Crossover, Mutation};
use super::population::Population;
use rand::seq::index::sample;
use rand::Rng;

/// Where mating parents (and, by default, replacement candidates) come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatingPool {
    /// The subproblem's `T` nearest neighbors.
    Neighborhood,
    /// The whole population.
    Population,
}

/// An unevaluated child together with the context it was bred in.
#[derive(Debug, Clone)]
pub struct Offspring {
    /// Subproblem the offspring was produced for.
    pub subproblem: usize,
    /// Decision variables, within bounds.
    pub variables: Vec<f64>,
    /// Pool the parents were drawn from.
    pub pool: MatingPool,
}

/// Mating selection and variation operators for one run.
#[derive(Debug, Clone)]
pub struct VariationPipeline<'a> {
    neighborhoods: &'a Neighborhoods,
    bounds: &'a Bounds,
    crossover: Crossover,
    mutation: Mutation,
    delta: f64,
    include_self: bool,
}

impl<'a> VariationPipeline<'a> {
    pub fn new(
        neighborhoods: &'a Neighborhoods,
        bounds: &'a Bounds,
        crossover: Crossover,
        mutation: Mutation,
        delta: f64,
        include_self: bool,
    ) -> Self {
        Self {
            neighborhoods,
            bounds,
            crossover,
            mutation,
            delta,
            include_self,
        }
    }

    /// Breeds one offspring for `subproblem`.
    pub fn produce<R: Rng>(&self, subproblem: usize, population: &Population, rng: &mut R) -> Offspring {
        let pool = self.choose_pool(rng);
        let parents = self.select_parents(subproblem, pool, population.len(), rng);

        let current = population.get(subproblem).variables();
        let parent_vars: Vec<&[f64]> = parents.iter().map(|&p| population.get(p).variables()).collect();

        let mut variables = self.crossover.apply(current, &parent_vars, self.bounds, rng);
        self.mutation.apply(&mut variables, self.bounds, rng);

        Offspring {
            subproblem,
            variables,
            pool,
        }
    }

    /// Neighborhood with probability `delta`, otherwise the whole population.
    pub fn choose_pool<R: Rng>(&self, rng: &mut R) -> MatingPool {
        if rng.random::<f64>() < self.delta {
            MatingPool::Neighborhood
        } else {
            MatingPool::Population
        }
    }

    /// Draws `crossover.arity()` distinct parent indices from `pool`.
    ///
    /// Falls back to the whole population when the pool (after removing
    /// `subproblem` itself, if self-mating is disabled) is too small.
    pub fn select_parents<R: Rng>(
        &self,
        subproblem: usize,
        pool: MatingPool,
        population_size: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let arity = self.crossover.arity();

        if pool == MatingPool::Neighborhood {
            let candidates: Vec<usize> = self
                .neighborhoods
                .get(subproblem)
                .iter()
                .copied()
                .filter(|&j| self.include_self || j != subproblem)
                .collect();
            if candidates.len() >= arity {
                return sample(rng, candidates.len(), arity)
                    .into_iter()
                    .map(|p| candidates[p])
                    .collect();
            }
        }

        if self.include_self {
            sample(rng, population_size, arity).into_vec()
        } else {
            // Sample from N - 1 slots and skip over `subproblem`
            sample(rng, population_size - 1, arity)
                .into_iter()
                .map(|p| if p >= subproblem { p + 1 } else { p })
                .collect()
        }
    }
}
