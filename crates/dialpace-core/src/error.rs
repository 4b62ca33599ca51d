//! Error types for the environment snapshot model.

use crate::field::Field;
use thiserror::Error;

/// Errors that can occur while querying an environment snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("required field '{0}' is missing from the environment")]
    MissingField(Field),
}
