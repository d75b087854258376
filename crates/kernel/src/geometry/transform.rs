use serde::{Deserialize, Serialize};

use super::point::Point2d;
use super::vector::Vec2;
use crate::MapperError;

/// The single linear mapping between the abstract vector space and the
/// device space: an origin offset plus a uniform scale, with Y inverted.
///
/// Construct through [`CoordinateMapper::new`], which rejects a zero or
/// non-finite scale; the conversions themselves are total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    origin: Point2d,
    scale: f64,
}

impl CoordinateMapper {
    pub fn new(origin: Point2d, scale: f64) -> Result<Self, MapperError> {
        if !origin.is_finite() {
            return Err(MapperError::NonFiniteOrigin {
                x: origin.x,
                y: origin.y,
            });
        }
        if !scale.is_finite() {
            return Err(MapperError::NonFiniteScale(scale));
        }
        if scale == 0.0 {
            return Err(MapperError::ZeroScale);
        }
        Ok(Self { origin, scale })
    }

    /// Device units per vector-space unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_vector_space(&self, device: Point2d) -> Vec2 {
        Vec2::new(
            (device.x - self.origin.x) / self.scale,
            (self.origin.y - device.y) / self.scale,
        )
    }

    pub fn to_device(&self, v: Vec2) -> Point2d {
        self.origin.offset_by(v, self.scale)
    }
}
