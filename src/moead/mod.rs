//! MOEA/D: Multi-Objective Evolutionary Algorithm based on Decomposition.
//!
//! Decomposes a multi-objective problem into `N` scalar subproblems, one per
//! weight vector, and optimizes them together. Each subproblem keeps a
//! single solution and breeds mostly with its `T` nearest neighbors in
//! weight space. Offspring replace at most `nr` neighbors they improve.
//! Users define their problem by implementing [`MoeadProblem`].
//!
//! # Key Types
//!
//! - [`MoeadConfig`]: Algorithm parameters (sizes, operators, presets)
//! - [`Moead`]: Step-wise engine with an explicit [`Phase`]
//! - [`MoeadRunner`]: Runs an engine to termination
//! - [`MoeadResult`]: Final population, weights, ideal point and counters
//!
//! # Building Blocks
//!
//! - [`WeightVectors`]: Uniform, simplex-lattice or tabulated weights
//! - [`Neighborhoods`]: `T` nearest weight vectors per subproblem
//! - [`Scalarizing`]: Tchebycheff, weighted sum, PBI
//! - [`Crossover`], [`Mutation`]: DE/rand/1/bin, SBX, BLX-α, polynomial
//! - [`ReplacementPolicy`]: Bounded, scalarized replacement
//! - [`Termination`]: Evaluation, generation, time and stagnation limits
//!
//! # References
//!
//! - Zhang & Li (2007), "MOEA/D: A Multiobjective Evolutionary Algorithm Based on Decomposition"
//! - Li & Zhang (2009), "Multiobjective Optimization Problems With Complicated Pareto Sets, MOEA/D and NSGA-II"
//! - Das & Dennis (1998), "Normal-Boundary Intersection"

mod config;
mod error;
mod neighborhood;
mod operators;
mod population;
mod replacement;
mod runner;
mod scalarize;
mod termination;
mod types;
mod variation;
mod weights;

pub use config::{MoeadConfig, SubproblemOrder};
pub use error::{ConfigError, EvaluationError, MoeadError};
pub use neighborhood::Neighborhoods;
pub use operators::{Bounds, Crossover, Mutation};
pub use population::Population;
pub use replacement::{ReplacementPolicy, ReplacementScope};
pub use runner::{Moead, MoeadResult, MoeadRunner, Phase};
pub use scalarize::{Scalarizing, TCHEBYCHEFF_EPSILON};
pub use termination::{AlgorithmStatus, Termination, TerminationCriterion};
pub use types::{MoeadProblem, Solution};
pub use variation::{MatingPool, Offspring, VariationPipeline};
pub use weights::{WeightSource, WeightVectors};
