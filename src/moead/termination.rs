//! Termination criteria.
//!
//! A criterion is a stateless predicate over [`AlgorithmStatus`], checked
//! once at the end of every generation. All bundled criteria are monotone:
//! once met for some status, they stay met as the tracked quantity grows.

use std::time::Duration;

/// Snapshot of the loop's progress, rebuilt after every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmStatus {
    /// Objective evaluations so far, including initialization.
    pub evaluations: usize,
    /// Completed generations.
    pub generations: usize,
    /// Wall-clock time since the loop started.
    pub elapsed: Duration,
    /// Consecutive generations in which the ideal point did not move.
    pub stagnant_generations: usize,
    /// Current ideal point.
    pub ideal_point: Vec<f64>,
}

/// Decides when the optimization loop stops.
///
/// Implementations must not depend on anything but `status`.
pub trait TerminationCriterion {
    fn is_met(&self, status: &AlgorithmStatus) -> bool;
}

impl<F> TerminationCriterion for F
where
    F: Fn(&AlgorithmStatus) -> bool,
{
    fn is_met(&self, status: &AlgorithmStatus) -> bool {
        self(status)
    }
}

/// Bundled stopping conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Stop once `evaluations >= max`.
    Evaluations(usize),
    /// Stop once `generations >= max`.
    Generations(usize),
    /// Stop once the elapsed wall-clock time reaches the limit.
    WallClock(Duration),
    /// Stop once the ideal point has not improved for this many generations.
    Stagnation(usize),
    /// Stop as soon as any inner condition is met.
    Any(Vec<Termination>),
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Evaluations(25_000)
    }
}

impl TerminationCriterion for Termination {
    fn is_met(&self, status: &AlgorithmStatus) -> bool {
        match self {
            Termination::Evaluations(max) => status.evaluations >= *max,
            Termination::Generations(max) => status.generations >= *max,
            Termination::WallClock(limit) => status.elapsed >= *limit,
            Termination::Stagnation(limit) => status.stagnant_generations >= *limit,
            Termination::Any(inner) => inner.iter().any(|t| t.is_met(status)),
        }
    }
}

impl Termination {
    /// Rejects thresholds that would stop before the first generation.
    pub(crate) fn validate(&self) -> Result<(), super::error::ConfigError> {
        use super::error::ConfigError;
        match self {
            Termination::Evaluations(0) => Err(ConfigError::invalid("termination", "max evaluations must be at least 1")),
            Termination::Generations(0) => Err(ConfigError::invalid("termination", "max generations must be at least 1")),
            Termination::WallClock(d) if d.is_zero() => {
                Err(ConfigError::invalid("termination", "time limit must be positive"))
            }
            Termination::Stagnation(0) => Err(ConfigError::invalid("termination", "stagnation limit must be at least 1")),
            Termination::Any(inner) if inner.is_empty() => {
                Err(ConfigError::invalid("termination", "`Any` needs at least one condition"))
            }
            Termination::Any(inner) => inner.iter().try_for_each(Termination::validate),
            _ => Ok(()),
        }
    }
}
