use serde::{Deserialize, Serialize};

use super::vector::Vec2;

/// A point in device (display) space. Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Moves by a vector-space offset at the given pixels-per-unit scale.
    /// Device Y is inverted relative to vector-space Y.
    pub fn offset_by(&self, v: Vec2, scale: f64) -> Self {
        Point2d::new(self.x + v.x * scale, self.y - v.y * scale)
    }

    pub fn from_array(arr: [f64; 2]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
        }
    }
}

impl From<[f64; 2]> for Point2d {
    fn from(arr: [f64; 2]) -> Self {
        Point2d::from_array(arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point2d::new(960.0, 540.0);
        let b = Point2d::new(1260.0, 140.0);
        assert!((a.distance_to(&b) - 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_inverts_y() {
        let origin = Point2d::new(960.0, 540.0);
        let p = origin.offset_by(Vec2::new(1.0, 2.0), 100.0);
        assert!((p.x - 1060.0).abs() < 1e-12);
        assert!((p.y - 340.0).abs() < 1e-12);
    }
}
