use lincomb_kernel::{Tolerance, Vec2};
use serde::Serialize;

use crate::errors::ConfigurationError;

/// A direction vector checked once to be finite and non-zero, so that
/// projecting onto it never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Direction(Vec2);

impl Direction {
    /// Validate `v` with the default tolerance. `label` names the vector in
    /// the error (e.g. `"a2"`).
    pub fn new(label: &'static str, v: Vec2) -> Result<Self, ConfigurationError> {
        Self::with_tolerance(label, v, &Tolerance::default())
    }

    pub fn with_tolerance(
        label: &'static str,
        v: Vec2,
        tol: &Tolerance,
    ) -> Result<Self, ConfigurationError> {
        if !v.is_finite() {
            return Err(ConfigurationError::NonFiniteVector {
                label,
                x: v.x,
                y: v.y,
            });
        }
        // length_squared is the projection divisor; it may underflow to 0
        if v.length_squared() == 0.0 || tol.is_zero_length(&v) {
            return Err(ConfigurationError::ZeroDirection { label });
        }
        Ok(Self(v))
    }

    pub fn vector(&self) -> Vec2 {
        self.0
    }
}

/// Signed projection weight of `point` along `direction`:
/// `(point . d) / (d . d)`. The component of `point` along `d` is
/// `project(point, d) * d`.
pub fn project(point: Vec2, direction: &Direction) -> f64 {
    let d = direction.0;
    point.dot(&d) / d.length_squared()
}

/// Inverse of [`project`] for points on the line: `k * d`.
pub fn position_for(k: f64, direction: &Direction) -> Vec2 {
    k * direction.0
}
