//! Scene configuration: the coordinate mapping, the three directions, the
//! target and the starting weights, loadable from JSON.

use lincomb_kernel::{CoordinateMapper, Point2d, Tolerance, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::engine::{ActiveIndex, ReactiveEngine};
use crate::errors::ConfigurationError;

/// Serializable description of one diagram. Missing JSON fields fall back
/// to the reference scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Device position of the vector-space origin.
    pub origin: [f64; 2],
    /// Device units per vector-space unit.
    pub scale: f64,
    /// `[a1, a2, a3]`.
    pub directions: [[f64; 2]; 3],
    /// `b`.
    pub target: [f64; 2],
    /// Weights used to place the input handles before the first drag.
    pub initial_weights: [f64; 3],
    /// Slot that starts out active.
    pub active: u8,
    pub tolerance: Tolerance,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl SceneConfig {
    /// The reference diagram: a 1920x1080 canvas centred at (960, 540) with
    /// 100 px per unit, `a = (1,2), (2,3), (3,1)`, `b = (4,2)` and
    /// `k = (-1, 1, 1)`.
    pub fn reference() -> Self {
        Self {
            origin: [960.0, 540.0],
            scale: 100.0,
            directions: [[1.0, 2.0], [2.0, 3.0], [3.0, 1.0]],
            target: [4.0, 2.0],
            initial_weights: [-1.0, 1.0, 1.0],
            active: 1,
            tolerance: Tolerance::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    /// Validate everything and build the runtime scene.
    #[instrument(skip(self))]
    pub fn build(&self) -> Result<Scene, ConfigurationError> {
        let mapper = CoordinateMapper::new(Point2d::from(self.origin), self.scale)?;
        let engine = ReactiveEngine::with_tolerance(
            self.directions.map(Vec2::from),
            Vec2::from(self.target),
            self.tolerance,
        )?;
        let active = ActiveIndex::try_from(self.active)?;
        if let Some((i, &value)) = self
            .initial_weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite())
        {
            return Err(ConfigurationError::NonFiniteWeight {
                index: i + 1,
                value,
            });
        }
        if !engine.satisfies_invariant(&self.initial_weights) {
            warn!(
                residual = engine.residual(&self.initial_weights),
                "initial weights miss the target; derived slots move on first evaluation"
            );
        }
        info!(%active, scale = self.scale, "scene built");
        Ok(Scene {
            mapper,
            engine,
            initial_weights: self.initial_weights,
            active,
        })
    }
}

/// A validated scene, ready to evaluate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub mapper: CoordinateMapper,
    pub engine: ReactiveEngine,
    pub initial_weights: [f64; 3],
    pub active: ActiveIndex,
}

impl Scene {
    /// Device positions of the three input handles before any drag.
    pub fn seed_positions(&self) -> [Point2d; 3] {
        self.engine.seed_positions(&self.initial_weights, &self.mapper)
    }
}
