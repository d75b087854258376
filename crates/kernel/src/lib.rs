pub mod geometry;

pub use geometry::{CoordinateMapper, Point2d, Vec2};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`CoordinateMapper`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapperError {
    #[error("coordinate scale must be non-zero")]
    ZeroScale,
    #[error("coordinate scale must be finite (got {0})")]
    NonFiniteScale(f64),
    #[error("coordinate origin must be finite (got ({x}, {y}))")]
    NonFiniteOrigin { x: f64, y: f64 },
}

/// A [`Tolerance`] field that is not a positive finite number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("tolerance `{field}` must be positive and finite (got {value})")]
pub struct ToleranceError {
    pub field: &'static str,
    pub value: f64,
}

/// Global tolerance configuration for the engine's numeric checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Vectors shorter than this are treated as the zero vector.
    pub zero_length: f64,
    /// Two directions whose |sin(angle)| is below this are parallel.
    pub degenerate_sine: f64,
    /// Relative tolerance for the weighted-sum invariant.
    pub invariant: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            zero_length: 1e-15,
            degenerate_sine: 1e-12,
            invariant: 1e-9,
        }
    }
}

impl Tolerance {
    /// Every threshold must be a positive finite number. A zero or negative
    /// threshold would disable the check it guards.
    pub fn validate(&self) -> Result<(), ToleranceError> {
        for (field, value) in [
            ("zero_length", self.zero_length),
            ("degenerate_sine", self.degenerate_sine),
            ("invariant", self.invariant),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ToleranceError { field, value });
            }
        }
        Ok(())
    }

    pub fn is_zero_length(&self, v: &Vec2) -> bool {
        v.length() < self.zero_length
    }

    pub fn is_parallel(&self, a: &Vec2, b: &Vec2) -> bool {
        a.is_parallel_to(b, self.degenerate_sine)
    }

    /// Whether `residual` is negligible next to `magnitude`, the size of the
    /// largest term that produced it.
    pub fn within_invariant(&self, residual: f64, magnitude: f64) -> bool {
        residual <= self.invariant * (1.0 + magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length() {
        let tol = Tolerance::default();
        assert!(tol.is_zero_length(&Vec2::ZERO));
        assert!(!tol.is_zero_length(&Vec2::new(1e-9, 0.0)));
    }

    #[test]
    fn test_parallel_uses_sine_threshold() {
        let tol = Tolerance::default();
        assert!(tol.is_parallel(&Vec2::new(1.0, 2.0), &Vec2::new(2.0, 4.0)));
        assert!(tol.is_parallel(&Vec2::new(1.0, 2.0), &Vec2::new(-3.0, -6.0)));
        assert!(!tol.is_parallel(&Vec2::new(1.0, 2.0), &Vec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_within_invariant_scales_with_magnitude() {
        let tol = Tolerance::default();
        assert!(tol.within_invariant(1e-10, 0.0));
        assert!(!tol.within_invariant(1e-6, 0.0));
        assert!(tol.within_invariant(1e-6, 1e4));
    }

    #[test]
    fn test_validate_rejects_disabled_thresholds() {
        assert!(Tolerance::default().validate().is_ok());

        let zero_sine = Tolerance {
            degenerate_sine: 0.0,
            ..Tolerance::default()
        };
        assert_eq!(
            zero_sine.validate(),
            Err(ToleranceError {
                field: "degenerate_sine",
                value: 0.0
            })
        );

        let negative: Tolerance = serde_json::from_str(r#"{"zero_length": -1.0}"#).unwrap();
        assert!(matches!(
            negative.validate(),
            Err(ToleranceError { field: "zero_length", .. })
        ));

        let nan = Tolerance {
            invariant: f64::NAN,
            ..Tolerance::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_tolerance_partial_json() {
        let tol: Tolerance = serde_json::from_str(r#"{"degenerate_sine": 1e-6}"#).unwrap();
        assert!((tol.degenerate_sine - 1e-6).abs() < 1e-18);
        assert!((tol.invariant - 1e-9).abs() < 1e-18);
    }
}
