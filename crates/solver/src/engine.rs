//! Reactive evaluation of the three-weight network.
//!
//! Three fixed directions `a1, a2, a3` and a fixed target `b` define the
//! invariant `k1*a1 + k2*a2 + k3*a3 = b`. On every input sample one slot is
//! active: its weight is read from the dragged position, the other two are
//! derived so that the invariant holds. Nothing is carried between calls,
//! so switching the active slot or re-evaluating is always safe.

use std::fmt;

use lincomb_kernel::{CoordinateMapper, Point2d, Tolerance, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::{ConfigurationError, SolverError};
use crate::projector::{Direction, position_for, project};
use crate::solver::LinearSolver2;

/// Which of the three slots is driven by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActiveIndex {
    One,
    Two,
    Three,
}

impl ActiveIndex {
    pub const ALL: [ActiveIndex; 3] = [ActiveIndex::One, ActiveIndex::Two, ActiveIndex::Three];

    /// Zero-based slot position.
    pub fn slot(self) -> usize {
        match self {
            ActiveIndex::One => 0,
            ActiveIndex::Two => 1,
            ActiveIndex::Three => 2,
        }
    }

    /// One-based slot number, as shown to users.
    pub fn number(self) -> u8 {
        self.slot() as u8 + 1
    }

    /// The two derived slots, in ascending order.
    pub fn others(self) -> (ActiveIndex, ActiveIndex) {
        match self {
            ActiveIndex::One => (ActiveIndex::Two, ActiveIndex::Three),
            ActiveIndex::Two => (ActiveIndex::One, ActiveIndex::Three),
            ActiveIndex::Three => (ActiveIndex::One, ActiveIndex::Two),
        }
    }

    /// Read a host's numeric mode switch. The value is rounded to the
    /// nearest integer; anything outside 1..=3 is rejected.
    pub fn from_slider(value: f64) -> Result<Self, ConfigurationError> {
        let rounded = value.round();
        if !(1.0..=3.0).contains(&rounded) {
            return Err(ConfigurationError::InvalidActiveIndex { value });
        }
        Self::try_from(rounded as u8)
    }
}

impl TryFrom<u8> for ActiveIndex {
    type Error = ConfigurationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ActiveIndex::One),
            2 => Ok(ActiveIndex::Two),
            3 => Ok(ActiveIndex::Three),
            _ => Err(ConfigurationError::InvalidActiveIndex {
                value: value as f64,
            }),
        }
    }
}

impl From<ActiveIndex> for u8 {
    fn from(active: ActiveIndex) -> Self {
        active.number()
    }
}

impl fmt::Display for ActiveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.number())
    }
}

/// Fully derived state produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The slot whose input was read.
    pub active: ActiveIndex,
    /// `[k1, k2, k3]`.
    pub weights: [f64; 3],
    /// Device positions of `k_i * a_i`.
    pub positions: [Point2d; 3],
    /// `|k1*a1 + k2*a2 + k3*a3 - b|` in vector-space units.
    pub residual: f64,
}

impl Evaluation {
    pub fn weight(&self, slot: ActiveIndex) -> f64 {
        self.weights[slot.slot()]
    }

    pub fn position(&self, slot: ActiveIndex) -> Point2d {
        self.positions[slot.slot()]
    }
}

/// The configured, immutable engine. Cheap to copy and safe to share
/// between threads; every method takes `&self`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactiveEngine {
    directions: [Direction; 3],
    target: Vec2,
    tolerance: Tolerance,
}

impl ReactiveEngine {
    /// Configure with the default tolerance. Fails if any direction is the
    /// zero vector or any component is non-finite. A custom tolerance must
    /// have positive finite thresholds. Parallel directions are
    /// accepted here and reported by [`evaluate`](Self::evaluate), since
    /// whether they matter depends on the active slot.
    pub fn configure(a1: Vec2, a2: Vec2, a3: Vec2, b: Vec2) -> Result<Self, ConfigurationError> {
        Self::with_tolerance([a1, a2, a3], b, Tolerance::default())
    }

    #[instrument]
    pub fn with_tolerance(
        directions: [Vec2; 3],
        target: Vec2,
        tolerance: Tolerance,
    ) -> Result<Self, ConfigurationError> {
        tolerance.validate()?;
        let [a1, a2, a3] = directions;
        let directions = [
            Direction::with_tolerance("a1", a1, &tolerance)?,
            Direction::with_tolerance("a2", a2, &tolerance)?,
            Direction::with_tolerance("a3", a3, &tolerance)?,
        ];
        if !target.is_finite() {
            return Err(ConfigurationError::NonFiniteVector {
                label: "b",
                x: target.x,
                y: target.y,
            });
        }
        for active in ActiveIndex::ALL {
            let (j, k) = active.others();
            let (dj, dk) = (directions[j.slot()].vector(), directions[k.slot()].vector());
            if tolerance.is_parallel(&dj, &dk) {
                info!(%active, %j, %k, "parallel directions, slot can never be active");
            }
        }
        info!("reactive engine configured");
        Ok(Self {
            directions,
            target,
            tolerance,
        })
    }

    pub fn direction(&self, slot: ActiveIndex) -> Vec2 {
        self.directions[slot.slot()].vector()
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Derive all three weights from the active slot's weight, in vector
    /// space. The active weight is passed through untouched.
    pub fn solve_weights(
        &self,
        active: ActiveIndex,
        k_active: f64,
    ) -> Result<[f64; 3], SolverError> {
        let (j, k) = active.others();
        let residual = self.target - position_for(k_active, &self.directions[active.slot()]);
        let solver = LinearSolver2::new(&self.directions[j.slot()], &self.directions[k.slot()]);
        let Some((k_j, k_k)) = solver.solve(residual, &self.tolerance) else {
            warn!(%active, determinant = solver.determinant(), "degenerate system");
            return Err(SolverError::Degenerate {
                active,
                determinant: solver.determinant(),
            });
        };
        let mut weights = [0.0; 3];
        weights[active.slot()] = k_active;
        weights[j.slot()] = k_j;
        weights[k.slot()] = k_k;
        Ok(weights)
    }

    /// Evaluate one input sample: read the active slot's device position,
    /// derive the other two weights and map all three positions back to
    /// device space. All-or-nothing: any failure yields no output.
    #[instrument(skip(self, mapper))]
    pub fn evaluate(
        &self,
        active: ActiveIndex,
        position: Point2d,
        mapper: &CoordinateMapper,
    ) -> Result<Evaluation, SolverError> {
        if !position.is_finite() {
            return Err(SolverError::NonFiniteInput {
                x: position.x,
                y: position.y,
            });
        }
        let k_active = project(mapper.to_vector_space(position), &self.directions[active.slot()]);
        let weights = self.solve_weights(active, k_active)?;
        if weights.iter().any(|w| !w.is_finite()) {
            warn!(%active, ?weights, "weights overflowed");
            return Err(SolverError::Overflow { active });
        }
        let positions = self.seed_positions(&weights, mapper);
        if positions.iter().any(|p| !p.is_finite()) {
            warn!(%active, ?weights, "device positions overflowed");
            return Err(SolverError::Overflow { active });
        }

        let residual = self.residual(&weights);
        if !self.tolerance.within_invariant(residual, self.magnitude(&weights)) {
            warn!(residual, "weighted sum drifted from target");
        }
        debug!(
            k1 = weights[0],
            k2 = weights[1],
            k3 = weights[2],
            residual,
            "evaluated"
        );

        Ok(Evaluation {
            active,
            weights,
            positions,
            residual,
        })
    }

    /// Device positions of `k_i * a_i` for the given weights. Hosts use this
    /// to place their input handles before the first drag.
    pub fn seed_positions(&self, weights: &[f64; 3], mapper: &CoordinateMapper) -> [Point2d; 3] {
        [0, 1, 2].map(|i| mapper.to_device(position_for(weights[i], &self.directions[i])))
    }

    /// Length of `k1*a1 + k2*a2 + k3*a3 - b`.
    pub fn residual(&self, weights: &[f64; 3]) -> f64 {
        let sum = (0..3).fold(Vec2::ZERO, |acc, i| {
            acc + position_for(weights[i], &self.directions[i])
        });
        (sum - self.target).length()
    }

    /// Whether `weights` satisfy the invariant within the configured
    /// relative tolerance.
    pub fn satisfies_invariant(&self, weights: &[f64; 3]) -> bool {
        self.tolerance
            .within_invariant(self.residual(weights), self.magnitude(weights))
    }

    fn magnitude(&self, weights: &[f64; 3]) -> f64 {
        (0..3)
            .map(|i| position_for(weights[i], &self.directions[i]).length())
            .fold(self.target.length(), f64::max)
    }
}
