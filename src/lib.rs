//! Decomposition-based multi-objective evolutionary optimization.
//!
//! Provides a generic implementation of MOEA/D over continuous, box-bounded
//! decision variables:
//!
//! - **MOEA/D**: Decomposes the problem into scalar subproblems along
//!   weight vectors and evolves one solution per subproblem, mating and
//!   replacing mostly within weight-space neighborhoods.
//! - **Pareto utilities**: Dominance tests and non-dominated filtering for
//!   post-processing a final population.
//! - **Random**: Seeded RNG construction for reproducible runs.
//!
//! # Architecture
//!
//! The crate contains no domain-specific concepts. Problems are supplied by
//! implementing [`moead::MoeadProblem`]; everything else is configured
//! through [`moead::MoeadConfig`].
//!
//! # Features
//!
//! - `parallel`: evaluate each generation's offspring on the rayon pool
//! - `serde`: serialization for weights, neighborhoods, solutions and
//!   operator settings

pub mod moead;
pub mod pareto;
pub mod random;
