//! Solver error types.

use dialpace_core::{EnvironmentError, Field};
use thiserror::Error;

/// Errors surfaced by the pacing solvers.
///
/// None of these are retried internally: the solvers perform no I/O, so
/// there is no transient failure to wait out. Division hazards in the
/// predictive path are guard branches, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolverError {
    #[error("environment does not satisfy solver: required field '{0}' is missing")]
    EnvironmentMismatch(Field),

    #[error(
        "invalid observation: calls_total ({calls_total}) is less than calls_answered ({calls_answered})"
    )]
    InvalidObservation {
        calls_total: f64,
        calls_answered: f64,
    },

    #[error("no environment observed; call observe() before predicting")]
    NotObserved,
}

impl From<EnvironmentError> for SolverError {
    fn from(err: EnvironmentError) -> Self {
        match err {
            EnvironmentError::MissingField(field) => SolverError::EnvironmentMismatch(field),
        }
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
