//! Error kinds.
//!
//! [`ConfigError`] is raised only while a run is being set up, before the
//! first evaluation. Everything that can go wrong once the loop is running
//! is a [`MoeadError`].

use std::path::PathBuf;
use thiserror::Error;

/// Invalid parameters discovered at setup. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A scalar parameter is outside its allowed range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// No generation strategy exists for this (count, objectives) pair.
    #[error("cannot build {count} weight vectors for {n_objectives} objectives: {reason}")]
    UnsupportedWeightDimensions {
        count: usize,
        n_objectives: usize,
        reason: String,
    },

    /// Neighborhood size larger than the population.
    #[error("neighborhood size {neighborhood_size} exceeds population size {population_size}")]
    NeighborhoodTooLarge {
        neighborhood_size: usize,
        population_size: usize,
    },

    /// A weight table could not be parsed or failed validation.
    #[error("invalid weight table: {0}")]
    WeightTable(String),

    /// A weight table file could not be read.
    #[error("failed to read weight table {path}: {source}")]
    WeightFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The problem definition is unusable (bounds, dimensions).
    #[error("invalid problem: {0}")]
    Problem(String),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Failure reported by a problem's objective function.
///
/// The engine never retries an evaluation: objective functions are
/// assumed deterministic.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    /// Creates an evaluation error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by the optimization loop.
#[derive(Debug, Error)]
pub enum MoeadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Objective evaluation failed; the run is aborted.
    #[error("evaluation failed for subproblem {subproblem}: {source}")]
    Evaluation {
        subproblem: usize,
        #[source]
        source: EvaluationError,
    },

    /// The problem returned the wrong number of objective values.
    #[error("subproblem {subproblem}: expected {expected} objective values, got {actual}")]
    ObjectiveCount {
        subproblem: usize,
        expected: usize,
        actual: usize,
    },

    /// A decision vector has the wrong number of variables.
    #[error("subproblem {subproblem}: expected {expected} variables, got {actual}")]
    VariableCount {
        subproblem: usize,
        expected: usize,
        actual: usize,
    },

    /// A variable escaped its bounds. Indicates a bug in an operator.
    #[error("variable {variable} = {value} outside [{lower}, {upper}]")]
    BoundsViolation {
        variable: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    /// The engine has already terminated and cannot be resumed.
    #[error("optimization loop already terminated")]
    Terminated,

    /// An operation was invoked in the wrong phase of the loop.
    #[error("operation not valid in phase {0:?}")]
    InvalidPhase(super::runner::Phase),
}
