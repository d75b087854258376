pub mod config;
pub mod constraint;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod projector;
pub mod solver;

pub use config::{Scene, SceneConfig};
pub use constraint::{LineConstraint, LineSolution, evaluate_line_constraint};
pub use driver::{DriveStatus, Driver};
pub use engine::{ActiveIndex, Evaluation, ReactiveEngine};
pub use errors::{ConfigurationError, Error, SolverError};
pub use projector::{Direction, position_for, project};
pub use solver::LinearSolver2;

pub use lincomb_kernel::{CoordinateMapper, Point2d, Tolerance, Vec2};
