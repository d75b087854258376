use lincomb_kernel::{CoordinateMapper, Point2d};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::Scene;
use crate::engine::{ActiveIndex, Evaluation, ReactiveEngine};
use crate::errors::SolverError;

/// Outcome of the most recent drive step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveStatus {
    /// The shown evaluation reflects the latest input.
    Solved,
    /// The latest input has no solution; the previous evaluation is still
    /// shown.
    Degenerate { determinant: f64 },
}

/// Host-side session around a [`ReactiveEngine`].
///
/// Keeps one input handle per slot, the active selector and the last valid
/// evaluation. Only the active handle is ever written by a drag; derived
/// positions are read from the evaluation and never fed back as input,
/// except when a slot becomes active through [`select`](Self::select).
#[derive(Debug, Clone)]
pub struct Driver {
    engine: ReactiveEngine,
    mapper: CoordinateMapper,
    inputs: [Point2d; 3],
    active: ActiveIndex,
    last: Evaluation,
    status: DriveStatus,
}

impl Driver {
    /// Seed the handles from the scene's initial weights and evaluate once.
    /// Fails if the starting active slot is degenerate.
    pub fn new(scene: &Scene) -> Result<Self, SolverError> {
        let inputs = scene.seed_positions();
        let last = scene
            .engine
            .evaluate(scene.active, inputs[scene.active.slot()], &scene.mapper)?;
        Ok(Self {
            engine: scene.engine,
            mapper: scene.mapper,
            inputs,
            active: scene.active,
            last,
            status: DriveStatus::Solved,
        })
    }

    pub fn active(&self) -> ActiveIndex {
        self.active
    }

    pub fn status(&self) -> DriveStatus {
        self.status
    }

    /// The last valid evaluation.
    pub fn evaluation(&self) -> &Evaluation {
        &self.last
    }

    /// Raw input handle position for a slot.
    pub fn input(&self, slot: ActiveIndex) -> Point2d {
        self.inputs[slot.slot()]
    }

    /// Move the active handle and re-evaluate. On any error other than a
    /// degenerate system the session is left untouched.
    #[instrument(skip(self))]
    pub fn drag(&mut self, position: Point2d) -> Result<DriveStatus, SolverError> {
        if !position.is_finite() {
            return Err(SolverError::NonFiniteInput {
                x: position.x,
                y: position.y,
            });
        }
        let mut inputs = self.inputs;
        inputs[self.active.slot()] = position;
        self.step(self.active, inputs)
    }

    /// Make another slot active. Its handle is placed where the last valid
    /// evaluation shows it, so switching alone moves nothing.
    #[instrument(skip(self))]
    pub fn select(&mut self, active: ActiveIndex) -> Result<DriveStatus, SolverError> {
        if active == self.active {
            return Ok(self.status);
        }
        info!(from = %self.active, to = %active, "switching active slot");
        let mut inputs = self.inputs;
        inputs[active.slot()] = self.last.position(active);
        self.step(active, inputs)
    }

    /// Switch using a host's numeric mode value.
    pub fn select_from_slider(&mut self, value: f64) -> Result<DriveStatus, crate::Error> {
        let active = ActiveIndex::from_slider(value)?;
        Ok(self.select(active)?)
    }

    /// Evaluate a candidate state and commit it. A degenerate system still
    /// commits the inputs but keeps the previous evaluation.
    fn step(
        &mut self,
        active: ActiveIndex,
        inputs: [Point2d; 3],
    ) -> Result<DriveStatus, SolverError> {
        let status = match self
            .engine
            .evaluate(active, inputs[active.slot()], &self.mapper)
        {
            Ok(eval) => {
                debug!(weights = ?eval.weights, "drive step solved");
                self.last = eval;
                DriveStatus::Solved
            }
            Err(SolverError::Degenerate { determinant, .. }) => {
                warn!(determinant, "keeping previous evaluation");
                DriveStatus::Degenerate { determinant }
            }
            Err(e) => return Err(e),
        };
        self.inputs = inputs;
        self.active = active;
        self.status = status;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn driver() -> Driver {
        Driver::new(&SceneConfig::reference().build().unwrap()).unwrap()
    }

    #[test]
    fn test_initial_state_matches_seed() {
        let d = driver();
        assert_eq!(d.active(), ActiveIndex::One);
        assert_eq!(d.status(), DriveStatus::Solved);
        let w = d.evaluation().weights;
        assert!((w[0] + 1.0).abs() < 1e-12);
        assert!((w[1] - 1.0).abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_drag_only_writes_active_input() {
        let mut d = driver();
        let before = [d.input(ActiveIndex::Two), d.input(ActiveIndex::Three)];
        // grid (0, 0): k1 = 0
        d.drag(Point2d::new(960.0, 540.0)).unwrap();
        assert_eq!(d.input(ActiveIndex::One), Point2d::new(960.0, 540.0));
        assert_eq!([d.input(ActiveIndex::Two), d.input(ActiveIndex::Three)], before);
        assert!(d.evaluation().weights[0].abs() < 1e-12);
        assert!(d.evaluation().residual < 1e-9);
    }

    #[test]
    fn test_select_keeps_weights() {
        let mut d = driver();
        d.drag(Point2d::new(900.0, 700.0)).unwrap();
        let before = d.evaluation().weights;
        assert_eq!(d.select(ActiveIndex::Three).unwrap(), DriveStatus::Solved);
        let after = d.evaluation().weights;
        for i in 0..3 {
            assert!((before[i] - after[i]).abs() < 1e-9, "slot {i}: {} vs {}", before[i], after[i]);
        }
    }

    #[test]
    fn test_degenerate_freezes_last_evaluation() {
        let cfg = SceneConfig {
            directions: [[1.0, 2.0], [2.0, 4.0], [3.0, 1.0]],
            initial_weights: [0.0, 0.0, 0.0],
            ..SceneConfig::reference()
        };
        let mut d = Driver::new(&cfg.build().unwrap()).unwrap();
        let frozen = *d.evaluation();

        let status = d.select(ActiveIndex::Three).unwrap();
        assert!(matches!(status, DriveStatus::Degenerate { .. }));
        assert_eq!(*d.evaluation(), frozen);

        let status = d.drag(Point2d::new(1000.0, 500.0)).unwrap();
        assert!(matches!(status, DriveStatus::Degenerate { .. }));
        assert_eq!(*d.evaluation(), frozen);

        // back to a solvable slot
        assert_eq!(d.select(ActiveIndex::One).unwrap(), DriveStatus::Solved);
    }

    #[test]
    fn test_non_finite_drag_is_rejected() {
        let mut d = driver();
        let before = d.input(ActiveIndex::One);
        assert!(d.drag(Point2d::new(f64::INFINITY, 0.0)).is_err());
        assert_eq!(d.input(ActiveIndex::One), before);
    }

    #[test]
    fn test_failed_drag_keeps_session() {
        // seeds land near 1e-300 px, so a 1e10 px drag overflows vector space
        let cfg = SceneConfig {
            origin: [0.0, 0.0],
            scale: 1e-300,
            ..SceneConfig::reference()
        };
        let mut d = Driver::new(&cfg.build().unwrap()).unwrap();
        let input = d.input(ActiveIndex::One);
        let eval = *d.evaluation();

        let err = d.drag(Point2d::new(1e10, 0.0)).unwrap_err();
        assert_eq!(
            err,
            SolverError::Overflow {
                active: ActiveIndex::One
            }
        );
        assert_eq!(d.input(ActiveIndex::One), input);
        assert_eq!(*d.evaluation(), eval);
        assert_eq!(d.status(), DriveStatus::Solved);
        assert_eq!(d.active(), ActiveIndex::One);
    }

    #[test]
    fn test_select_from_slider() {
        let mut d = driver();
        d.select_from_slider(2.2).unwrap();
        assert_eq!(d.active(), ActiveIndex::Two);
        assert!(d.select_from_slider(7.0).is_err());
        assert_eq!(d.active(), ActiveIndex::Two);
    }
}
