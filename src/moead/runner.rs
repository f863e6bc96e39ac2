//! MOEA/D optimization loop.
//!
//! [`Moead`] is the step-wise engine: it owns the weight vectors,
//! neighborhoods and population of one run and advances them one
//! generation at a time. [`MoeadRunner`] drives an engine to completion.
//!
//! ```text
//! Uninitialized --start--> Initializing --> Running --step--> Running
//!                                                   \--step--> Terminated
//! (an evaluation error in any phase after `start` also ends in Terminated)
//! ```

use super::config::{MoeadConfig, SubproblemOrder};
use super::error::{ConfigError, MoeadError};
use super::neighborhood::Neighborhoods;
use super::operators::Bounds;
use super::population::Population;
use super::replacement::ReplacementPolicy;
use super::termination::{AlgorithmStatus, TerminationCriterion};
use super::types::{MoeadProblem, Solution};
use super::variation::{MatingPool, VariationPipeline};
use super::weights::WeightVectors;
use crate::pareto;
use crate::random::rng_from_seed;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Constructed; no evaluation has happened yet.
    Uninitialized,
    /// Evaluating the initial population.
    Initializing,
    /// Accepting generations.
    Running,
    /// The termination criterion was met or an evaluation failed.
    /// Not resumable.
    Terminated,
}

/// Result of a MOEA/D run.
#[derive(Debug, Clone)]
pub struct MoeadResult {
    /// Final solution of every subproblem, in subproblem order.
    pub population: Vec<Solution>,

    /// Weight vectors, aligned with `population`.
    pub weights: WeightVectors,

    /// Final ideal point.
    pub ideal_point: Vec<f64>,

    /// Total objective evaluations, including initialization.
    pub evaluations: usize,

    /// Completed generations.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Ideal point after initialization and after each generation.
    pub ideal_history: Vec<Vec<f64>>,
}

impl MoeadResult {
    /// Mutually non-dominated members of the final population.
    ///
    /// Uses constrained domination, so infeasible solutions appear only
    /// when no feasible one exists.
    pub fn non_dominated(&self) -> Vec<&Solution> {
        let objectives: Vec<&[f64]> = self.population.iter().map(Solution::objectives).collect();
        let violations: Vec<f64> = self.population.iter().map(Solution::constraint_violation).collect();
        pareto::non_dominated_indices_constrained(&objectives, &violations)
            .into_iter()
            .map(|i| &self.population[i])
            .collect()
    }
}

/// Step-wise MOEA/D engine.
///
/// # Usage
///
/// ```
/// use u_moead::moead::{EvaluationError, Moead, MoeadConfig, MoeadProblem, Phase, Termination};
/// use u_moead::random::create_rng;
///
/// struct Convex;
///
/// impl MoeadProblem for Convex {
///     fn n_variables(&self) -> usize { 1 }
///     fn n_objectives(&self) -> usize { 2 }
///     fn lower_bound(&self, _i: usize) -> f64 { 0.0 }
///     fn upper_bound(&self, _i: usize) -> f64 { 1.0 }
///     fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, EvaluationError> {
///         Ok(vec![x[0], 1.0 - x[0].sqrt()])
///     }
/// }
///
/// let config = MoeadConfig::default()
///     .with_population_size(20)
///     .with_neighborhood_size(5)
///     .with_termination(Termination::Generations(3));
/// let mut engine = Moead::new(&Convex, &config)?;
/// let mut rng = create_rng(1);
///
/// engine.start(&mut rng)?;
/// while engine.step(&mut rng)? != Phase::Terminated {}
/// assert_eq!(engine.evaluations(), 20 * 4);
/// # Ok::<(), u_moead::moead::MoeadError>(())
/// ```
#[derive(Debug)]
pub struct Moead<'p, P: MoeadProblem> {
    problem: &'p P,
    config: MoeadConfig,
    weights: WeightVectors,
    neighborhoods: Neighborhoods,
    bounds: Bounds,
    population: Option<Population>,
    phase: Phase,
    generations: usize,
    stagnant_generations: usize,
    started: Option<Instant>,
    ideal_history: Vec<Vec<f64>>,
    peak_replacements: usize,
}

impl<'p, P: MoeadProblem> Moead<'p, P> {
    /// Validates `config` against `problem` and prepares weights and
    /// neighborhoods. No evaluation happens here.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: invalid parameters, fewer than two objectives,
    /// unusable bounds, or a weight source that cannot produce
    /// `population_size` vectors of the problem's dimension.
    pub fn new(problem: &'p P, config: &MoeadConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let n_objectives = problem.n_objectives();
        if n_objectives < 2 {
            return Err(ConfigError::Problem(format!(
                "at least 2 objectives required, got {n_objectives}"
            )));
        }
        let bounds = Bounds::from_problem(problem)?;
        let weights = config.weights.resolve(config.population_size, n_objectives)?;
        let neighborhoods = Neighborhoods::build(&weights, config.neighborhood_size)?;

        Ok(Self {
            problem,
            config: config.clone(),
            weights,
            neighborhoods,
            bounds,
            population: None,
            phase: Phase::Uninitialized,
            generations: 0,
            stagnant_generations: 0,
            started: None,
            ideal_history: Vec::new(),
            peak_replacements: 0,
        })
    }

    /// Evaluates the initial population. The counter ends at `N`.
    ///
    /// # Errors
    ///
    /// [`MoeadError::InvalidPhase`] unless the engine is uninitialized;
    /// otherwise the first evaluation failure, which terminates the engine.
    pub fn start<R: Rng>(&mut self, rng: &mut R) -> Result<(), MoeadError> {
        if self.phase != Phase::Uninitialized {
            return Err(MoeadError::InvalidPhase(self.phase));
        }
        info!(
            population_size = self.config.population_size,
            neighborhood_size = self.config.neighborhood_size,
            n_objectives = self.weights.n_objectives(),
            n_variables = self.bounds.len(),
            "starting MOEA/D"
        );

        self.phase = Phase::Initializing;
        self.started = Some(Instant::now());
        let population = match Population::initialize(self.problem, self.config.population_size, rng) {
            Ok(population) => population,
            Err(err) => {
                warn!(error = %err, "initialization failed, aborting run");
                self.phase = Phase::Terminated;
                return Err(err);
            }
        };
        self.ideal_history.push(population.ideal_point().to_vec());
        self.population = Some(population);
        self.phase = Phase::Running;
        Ok(())
    }

    /// Runs one generation, then checks the configured termination.
    ///
    /// Returns the phase after the generation: [`Phase::Running`] or
    /// [`Phase::Terminated`].
    ///
    /// # Errors
    ///
    /// [`MoeadError::Terminated`] after termination,
    /// [`MoeadError::InvalidPhase`] before [`start`](Self::start), or the
    /// first evaluation failure. A failed generation is not rolled back;
    /// the engine moves to [`Phase::Terminated`] instead.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Result<Phase, MoeadError> {
        let status = self.generation(rng)?;
        let met = self.config.termination.is_met(&status);
        Ok(self.conclude(met))
    }

    /// Like [`step`](Self::step), but checks `criterion` instead of the
    /// configured termination.
    pub fn step_until<R, C>(&mut self, rng: &mut R, criterion: &C) -> Result<Phase, MoeadError>
    where
        R: Rng,
        C: TerminationCriterion + ?Sized,
    {
        let status = self.generation(rng)?;
        let met = criterion.is_met(&status);
        Ok(self.conclude(met))
    }

    /// Snapshot of the current progress.
    pub fn status(&self) -> AlgorithmStatus {
        AlgorithmStatus {
            evaluations: self.evaluations(),
            generations: self.generations,
            elapsed: self.started.map_or(Duration::ZERO, |t| t.elapsed()),
            stagnant_generations: self.stagnant_generations,
            ideal_point: self.ideal_point().map(<[f64]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Objective evaluations so far.
    pub fn evaluations(&self) -> usize {
        self.population.as_ref().map_or(0, Population::evaluations)
    }

    /// Current ideal point, once the population exists.
    pub fn ideal_point(&self) -> Option<&[f64]> {
        self.population.as_ref().map(Population::ideal_point)
    }

    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    pub fn weights(&self) -> &WeightVectors {
        &self.weights
    }

    pub fn neighborhoods(&self) -> &Neighborhoods {
        &self.neighborhoods
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Largest number of subproblems any single offspring replaced so far.
    pub fn peak_replacements(&self) -> usize {
        self.peak_replacements
    }

    /// Consumes the engine, returning its current state as a result.
    ///
    /// Valid in any phase after [`start`](Self::start).
    pub fn into_result(self) -> Result<MoeadResult, MoeadError> {
        let phase = self.phase;
        let population = self.population.ok_or(MoeadError::InvalidPhase(phase))?;
        Ok(MoeadResult {
            ideal_point: population.ideal_point().to_vec(),
            evaluations: population.evaluations(),
            population: population.into_solutions(),
            weights: self.weights,
            generations: self.generations,
            cancelled: false,
            ideal_history: self.ideal_history,
        })
    }

    /// One pass over all subproblems. Returns the status after the pass.
    ///
    /// A generation that fails partway leaves the population half-updated,
    /// so any error ends the run.
    fn generation<R: Rng>(&mut self, rng: &mut R) -> Result<AlgorithmStatus, MoeadError> {
        match self.phase {
            Phase::Running => {}
            Phase::Terminated => return Err(MoeadError::Terminated),
            other => return Err(MoeadError::InvalidPhase(other)),
        }
        let outcome = self.advance(rng);
        if let Err(err) = &outcome {
            warn!(generation = self.generations + 1, error = %err, "generation failed, aborting run");
            self.phase = Phase::Terminated;
        }
        outcome
    }

    fn advance<R: Rng>(&mut self, rng: &mut R) -> Result<AlgorithmStatus, MoeadError> {
        let phase = self.phase;
        let population = self.population.as_mut().ok_or(MoeadError::InvalidPhase(phase))?;

        let n = population.len();
        let mut order: Vec<usize> = (0..n).collect();
        if self.config.subproblem_order == SubproblemOrder::Shuffled {
            order.shuffle(rng);
        }

        let variation = VariationPipeline::new(
            &self.neighborhoods,
            &self.bounds,
            self.config.crossover,
            self.config.mutation,
            self.config.delta,
            self.config.include_self,
        );
        let replacement = ReplacementPolicy::new(
            &self.weights,
            &self.neighborhoods,
            self.config.scalarizing,
            self.config.replacement_scope,
            self.config.max_replacements,
        );

        let ideal_before = population.ideal_point().to_vec();
        let mut replaced_total = 0;
        let mut record = |subproblem: usize, replaced: usize| {
            trace!(subproblem, replaced, "offspring applied");
            replaced_total += replaced;
            self.peak_replacements = self.peak_replacements.max(replaced);
        };

        if self.config.parallel {
            // Breed everything from the current snapshot, evaluate as a
            // batch, then apply replacements one offspring at a time.
            let mut pools: Vec<MatingPool> = Vec::with_capacity(n);
            let mut batch: Vec<(usize, Vec<f64>)> = Vec::with_capacity(n);
            for &k in &order {
                let child = variation.produce(k, population, rng);
                pools.push(child.pool);
                batch.push((child.subproblem, child.variables));
            }
            let evaluated = population.evaluate_batch(self.problem, batch, true)?;
            for ((k, solution), pool) in evaluated.into_iter().zip(pools) {
                let replaced = replacement.apply(&solution, k, pool, population, rng);
                record(k, replaced);
            }
        } else {
            for &k in &order {
                let child = variation.produce(k, population, rng);
                let solution = population.evaluate(self.problem, k, child.variables)?;
                let replaced = replacement.apply(&solution, k, child.pool, population, rng);
                record(k, replaced);
            }
        }

        let ideal = population.ideal_point().to_vec();
        if ideal == ideal_before {
            self.stagnant_generations += 1;
        } else {
            self.stagnant_generations = 0;
        }
        self.generations += 1;

        debug!(
            generation = self.generations,
            evaluations = population.evaluations(),
            replaced = replaced_total,
            ideal = ?ideal,
            "generation complete"
        );
        self.ideal_history.push(ideal);

        let status = self.status();
        self.problem.on_generation(&status);
        Ok(status)
    }

    fn conclude(&mut self, met: bool) -> Phase {
        if met {
            self.phase = Phase::Terminated;
            info!(
                evaluations = self.evaluations(),
                generations = self.generations,
                "MOEA/D terminated"
            );
        }
        self.phase
    }
}

/// Executes a MOEA/D run from start to termination.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = MoeadConfig::default().with_seed(42);
/// let result = MoeadRunner::run(&problem, &config)?;
/// for solution in result.non_dominated() {
///     println!("{:?}", solution.objectives());
/// }
/// ```
pub struct MoeadRunner;

impl MoeadRunner {
    /// Runs until the configured termination is met.
    ///
    /// # Errors
    ///
    /// A [`ConfigError`] before any evaluation, or the first evaluation
    /// failure.
    pub fn run<P: MoeadProblem>(problem: &P, config: &MoeadConfig) -> Result<MoeadResult, MoeadError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is checked before every generation. A cancelled run returns
    /// the population as it stood, with `cancelled` set.
    pub fn run_with_cancel<P: MoeadProblem>(
        problem: &P,
        config: &MoeadConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<MoeadResult, MoeadError> {
        drive(problem, config, None, cancel.as_deref())
    }

    /// Runs until `criterion` is met, ignoring `config.termination`.
    pub fn run_until<P, C>(problem: &P, config: &MoeadConfig, criterion: &C) -> Result<MoeadResult, MoeadError>
    where
        P: MoeadProblem,
        C: TerminationCriterion,
    {
        drive(problem, config, Some(criterion as &dyn TerminationCriterion), None)
    }
}

fn drive<P: MoeadProblem>(
    problem: &P,
    config: &MoeadConfig,
    criterion: Option<&dyn TerminationCriterion>,
    cancel: Option<&AtomicBool>,
) -> Result<MoeadResult, MoeadError> {
    let mut engine = Moead::new(problem, config)?;
    let mut rng = rng_from_seed(config.seed);

    engine.start(&mut rng)?;

    let mut cancelled = false;
    loop {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            warn!(generations = engine.generations(), "MOEA/D cancelled");
            cancelled = true;
            break;
        }
        let phase = match criterion {
            Some(c) => engine.step_until(&mut rng, c)?,
            None => engine.step(&mut rng)?,
        };
        if phase == Phase::Terminated {
            break;
        }
    }

    let mut result = engine.into_result()?;
    result.cancelled = cancelled;
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================
