//! MOEA/D configuration.
//!
//! [`MoeadConfig`] holds every parameter of a run as a typed field. It is
//! validated once when the run starts and never changes afterwards.

use super::error::ConfigError;
use super::operators::{Crossover, Mutation};
use super::replacement::ReplacementScope;
use super::scalarize::Scalarizing;
use super::termination::Termination;
use super::weights::WeightSource;

/// Order in which a generation visits the subproblems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubproblemOrder {
    /// `0, 1, …, N-1` every generation.
    Sequential,
    /// A fresh random permutation every generation.
    #[default]
    Shuffled,
}

/// Configuration for MOEA/D.
///
/// # Defaults
///
/// ```
/// use u_moead::moead::{MoeadConfig, Termination};
///
/// let config = MoeadConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.neighborhood_size, 20);
/// assert_eq!(config.max_replacements, 2);
/// assert_eq!(config.termination, Termination::Evaluations(25_000));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_moead::moead::{MoeadConfig, Scalarizing, Termination};
///
/// let config = MoeadConfig::default()
///     .with_population_size(91)
///     .with_neighborhood_size(10)
///     .with_scalarizing(Scalarizing::Pbi { theta: 5.0 })
///     .with_termination(Termination::Generations(300))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MoeadConfig {
    /// Number of subproblems (= weight vectors = population size).
    pub population_size: usize,

    /// Neighborhood size `T`, `1 ≤ T ≤ population_size`.
    ///
    /// Typical range: 10–20% of the population.
    pub neighborhood_size: usize,

    /// Probability of mating within the neighborhood (δ) instead of the
    /// whole population.
    pub delta: f64,

    /// Maximum number of subproblems one offspring may take over (`nr`).
    pub max_replacements: usize,

    /// Whether a subproblem's own solution may be drawn as a mating parent.
    pub include_self: bool,

    /// Crossover operator.
    pub crossover: Crossover,

    /// Mutation operator.
    pub mutation: Mutation,

    /// Scalarizing function used by replacement.
    pub scalarizing: Scalarizing,

    /// Which subproblems an offspring may replace.
    pub replacement_scope: ReplacementScope,

    /// Order in which each generation visits the subproblems.
    pub subproblem_order: SubproblemOrder,

    /// Where weight vectors come from.
    pub weights: WeightSource,

    /// When to stop.
    pub termination: Termination,

    /// Breed a whole generation from one snapshot and evaluate it in
    /// parallel (requires the `parallel` feature to actually use threads).
    ///
    /// Replacement still runs serially, in the generation's visit order.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for MoeadConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            neighborhood_size: 20,
            delta: 0.9,
            max_replacements: 2,
            include_self: true,
            crossover: Crossover::default(),
            mutation: Mutation::default(),
            scalarizing: Scalarizing::default(),
            replacement_scope: ReplacementScope::default(),
            subproblem_order: SubproblemOrder::default(),
            weights: WeightSource::default(),
            termination: Termination::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl MoeadConfig {
    /// Parameters of MOEA/D-DE (Li & Zhang, 2009).
    ///
    /// - Population: 300, T: 20, δ: 0.9, nr: 2
    /// - DE crossover CR 1.0, F 0.5; polynomial mutation η 20, p = 1/n
    /// - 150 000 evaluations
    pub fn moead_de() -> Self {
        Self {
            population_size: 300,
            termination: Termination::Evaluations(150_000),
            ..Self::default()
        }
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_neighborhood_size(mut self, t: usize) -> Self {
        self.neighborhood_size = t;
        self
    }

    /// Sets δ. Not clamped: out-of-range values fail [`validate`](Self::validate).
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_max_replacements(mut self, nr: usize) -> Self {
        self.max_replacements = nr;
        self
    }

    pub fn with_include_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self
    }

    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    pub fn with_scalarizing(mut self, scalarizing: Scalarizing) -> Self {
        self.scalarizing = scalarizing;
        self
    }

    pub fn with_replacement_scope(mut self, scope: ReplacementScope) -> Self {
        self.replacement_scope = scope;
        self
    }

    pub fn with_subproblem_order(mut self, order: SubproblemOrder) -> Self {
        self.subproblem_order = order;
        self
    }

    pub fn with_weights(mut self, weights: WeightSource) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Shorthand for `with_termination(Termination::Evaluations(n))`.
    pub fn with_max_evaluations(self, n: usize) -> Self {
        self.with_termination(Termination::Evaluations(n))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// Checks everything that does not depend on the problem; the runner
    /// checks the problem itself and the weight source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::invalid("population_size", "must be at least 2"));
        }
        if self.neighborhood_size == 0 {
            return Err(ConfigError::invalid("neighborhood_size", "must be at least 1"));
        }
        if self.neighborhood_size > self.population_size {
            return Err(ConfigError::NeighborhoodTooLarge {
                neighborhood_size: self.neighborhood_size,
                population_size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.delta) {
            return Err(ConfigError::invalid(
                "delta",
                format!("must be in [0, 1], got {}", self.delta),
            ));
        }
        if self.max_replacements == 0 {
            return Err(ConfigError::invalid("max_replacements", "must be at least 1"));
        }

        self.crossover.validate()?;
        self.mutation.validate()?;
        self.termination.validate()?;

        if let Scalarizing::Pbi { theta } = self.scalarizing {
            if !theta.is_finite() || theta < 0.0 {
                return Err(ConfigError::invalid("scalarizing.theta", format!("must be >= 0, got {theta}")));
            }
        }

        let eligible = self.population_size - usize::from(!self.include_self);
        if eligible < self.crossover.arity() {
            return Err(ConfigError::invalid(
                "population_size",
                format!(
                    "{} eligible mates but crossover needs {}",
                    eligible,
                    self.crossover.arity()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MoeadConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.neighborhood_size, 20);
        assert!((config.delta - 0.9).abs() < 1e-12);
        assert_eq!(config.max_replacements, 2);
        assert!(config.include_self);
        assert_eq!(config.crossover, Crossover::DifferentialEvolution { cr: 1.0, f: 0.5 });
        assert_eq!(
            config.mutation,
            Mutation::Polynomial {
                probability: None,
                distribution_index: 20.0
            }
        );
        assert_eq!(config.scalarizing, Scalarizing::Tchebycheff);
        assert_eq!(config.replacement_scope, ReplacementScope::MatingPool);
        assert_eq!(config.subproblem_order, SubproblemOrder::Shuffled);
        assert_eq!(config.weights, WeightSource::Uniform);
        assert!(!config.parallel);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_moead_de_preset() {
        let config = MoeadConfig::moead_de();
        assert_eq!(config.population_size, 300);
        assert_eq!(config.termination, Termination::Evaluations(150_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = MoeadConfig::default()
            .with_population_size(50)
            .with_neighborhood_size(5)
            .with_delta(0.8)
            .with_max_replacements(3)
            .with_include_self(false)
            .with_subproblem_order(SubproblemOrder::Sequential)
            .with_replacement_scope(ReplacementScope::Population)
            .with_max_evaluations(5000)
            .with_parallel(true)
            .with_seed(7);

        assert_eq!(config.population_size, 50);
        assert_eq!(config.neighborhood_size, 5);
        assert!((config.delta - 0.8).abs() < 1e-12);
        assert_eq!(config.max_replacements, 3);
        assert!(!config.include_self);
        assert_eq!(config.subproblem_order, SubproblemOrder::Sequential);
        assert_eq!(config.replacement_scope, ReplacementScope::Population);
        assert_eq!(config.termination, Termination::Evaluations(5000));
        assert!(config.parallel);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_neighborhood_too_large() {
        let err = MoeadConfig::default()
            .with_population_size(10)
            .with_neighborhood_size(11)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NeighborhoodTooLarge { .. }));
    }

    #[test]
    fn test_validate_neighborhood_equal_population_ok() {
        let config = MoeadConfig::default()
            .with_population_size(10)
            .with_neighborhood_size(10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_delta_range() {
        assert!(MoeadConfig::default().with_delta(-0.1).validate().is_err());
        assert!(MoeadConfig::default().with_delta(1.1).validate().is_err());
        assert!(MoeadConfig::default().with_delta(f64::NAN).validate().is_err());
        assert!(MoeadConfig::default().with_delta(0.0).validate().is_ok());
        assert!(MoeadConfig::default().with_delta(1.0).validate().is_ok());
    }

    #[test]
    fn test_validate_zero_replacements() {
        let err = MoeadConfig::default().with_max_replacements(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "max_replacements", .. }));
    }

    #[test]
    fn test_validate_population_too_small_for_arity() {
        let config = MoeadConfig::default()
            .with_population_size(2)
            .with_neighborhood_size(2)
            .with_include_self(false);
        assert!(config.validate().is_err());
        assert!(config.with_include_self(true).validate().is_ok());
    }

    #[test]
    fn test_validate_operator_parameters() {
        let config = MoeadConfig::default().with_crossover(Crossover::DifferentialEvolution { cr: 2.0, f: 0.5 });
        assert!(config.validate().is_err());

        let config = MoeadConfig::default().with_scalarizing(Scalarizing::Pbi { theta: -1.0 });
        assert!(config.validate().is_err());

        let config = MoeadConfig::default().with_termination(Termination::Generations(0));
        assert!(config.validate().is_err());
    }
}
