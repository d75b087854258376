use lincomb_kernel::{MapperError, ToleranceError};
use thiserror::Error;

use crate::engine::ActiveIndex;

/// Errors raised while building a scene. Fatal to that configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("direction vector {label} is the zero vector")]
    ZeroDirection { label: &'static str },

    #[error("{label} has a non-finite component ({x}, {y})")]
    NonFiniteVector { label: &'static str, x: f64, y: f64 },

    #[error("initial weight k{index} is not finite (got {value})")]
    NonFiniteWeight { index: usize, value: f64 },

    #[error("active index must be 1, 2 or 3 (got {value})")]
    InvalidActiveIndex { value: f64 },

    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    #[error("failed to parse scene: {0}")]
    Parse(String),
}

/// Errors raised by a single evaluation. Transient: the next input sample
/// may succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error(
        "no solution with {active} active: the other two directions are parallel (determinant {determinant})"
    )]
    Degenerate {
        active: ActiveIndex,
        determinant: f64,
    },

    #[error("input position ({x}, {y}) is not finite")]
    NonFiniteInput { x: f64, y: f64 },

    #[error("evaluation with {active} active overflowed to a non-finite value")]
    Overflow { active: ActiveIndex },
}

/// Either kind of failure, for entry points that validate and evaluate in
/// one call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}
