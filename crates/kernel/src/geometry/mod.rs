pub mod point;
pub mod vector;
pub mod transform;

pub use point::Point2d;
pub use transform::CoordinateMapper;
pub use vector::Vec2;
