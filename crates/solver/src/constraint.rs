use lincomb_kernel::{CoordinateMapper, Point2d, Tolerance, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{ConfigurationError, Error, SolverError};
use crate::projector::{Direction, position_for, project};

/// A single point confined to a line through the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineConstraint {
    direction: Direction,
}

/// Output of [`LineConstraint::evaluate`], in device space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSolution {
    /// Weight of the constrained point along the line direction.
    pub k: f64,
    /// The free point snapped onto the line.
    pub constrained: Point2d,
    /// Foot of the perpendicular from `constrained` onto the X axis.
    pub foot: Point2d,
}

impl LineConstraint {
    pub fn new(direction: Vec2) -> Result<Self, ConfigurationError> {
        Self::with_tolerance(direction, &Tolerance::default())
    }

    pub fn with_tolerance(direction: Vec2, tol: &Tolerance) -> Result<Self, ConfigurationError> {
        Ok(Self {
            direction: Direction::with_tolerance("line direction", direction, tol)?,
        })
    }

    /// The line `a*x + b*y = 0`, e.g. `2x - 3y = 0` runs along `(3, 2)`.
    pub fn from_equation(a: f64, b: f64) -> Result<Self, ConfigurationError> {
        Self::new(Vec2::new(-b, a))
    }

    /// The line through the origin and `p`.
    pub fn through_point(p: Vec2) -> Result<Self, ConfigurationError> {
        Self::new(p)
    }

    pub fn direction(&self) -> Vec2 {
        self.direction.vector()
    }

    /// Snap a vector-space point onto the line. Returns the weight, the
    /// constrained position and its foot on the X axis.
    pub fn constrain(&self, free: Vec2) -> (f64, Vec2, Vec2) {
        let k = project(free, &self.direction);
        let on_line = position_for(k, &self.direction);
        (k, on_line, Vec2::new(on_line.x, 0.0))
    }

    #[instrument(skip(self, mapper))]
    pub fn evaluate(
        &self,
        free: Point2d,
        mapper: &CoordinateMapper,
    ) -> Result<LineSolution, SolverError> {
        if !free.is_finite() {
            return Err(SolverError::NonFiniteInput {
                x: free.x,
                y: free.y,
            });
        }
        let (k, on_line, foot) = self.constrain(mapper.to_vector_space(free));
        debug!(k, "line constraint evaluated");
        Ok(LineSolution {
            k,
            constrained: mapper.to_device(on_line),
            foot: mapper.to_device(foot),
        })
    }

    /// Coefficients `(a, b)` of `a*x + b*y = 0`, rounded for display.
    pub fn equation_coefficients(&self, decimals: u32) -> (f64, f64) {
        let d = self.direction.vector();
        (round_to(d.y, decimals), round_to(-d.x, decimals))
    }

    /// Device endpoints of the drawn line for `x` in `[-extent, extent]`.
    /// A vertical line spans `y` over the same range instead.
    pub fn segment(&self, extent: f64, mapper: &CoordinateMapper) -> (Point2d, Point2d) {
        let d = self.direction.vector();
        let along = if d.x.abs() >= d.y.abs() * 1e-12 { d.x } else { d.y };
        let k = extent / along.abs();
        (
            mapper.to_device(position_for(-k, &self.direction)),
            mapper.to_device(position_for(k, &self.direction)),
        )
    }
}

/// Validate `direction` and snap `free` onto its line in one call.
pub fn evaluate_line_constraint(
    direction: Vec2,
    free: Point2d,
    mapper: &CoordinateMapper,
) -> Result<LineSolution, Error> {
    let line = LineConstraint::new(direction)?;
    Ok(line.evaluate(free, mapper)?)
}

/// Past 15 decimals an f64 has no more digits to round.
const MAX_DECIMALS: u32 = 15;

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let rounded = (value * factor).round() / factor;
    // -0.0 reads badly in a numeric label
    if rounded == 0.0 { 0.0 } else { rounded }
}
