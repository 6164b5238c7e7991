//! Infinite plane defined by a point and a normal

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Create a plane through `point` with the given (non-zero) normal
    pub fn new(point: [f64; 3], normal: [f64; 3]) -> ModelResult<Self> {
        let normal = Unit::try_new(Vector3::from(normal), f64::EPSILON).ok_or_else(|| {
            ModelError::InvalidArgument("plane normal must be a non-zero vector".into())
        })?;
        Ok(Self {
            point: Point3::from(point),
            normal,
        })
    }

    /// World XY plane at height `z`
    pub fn xy(z: f64) -> Self {
        Self {
            point: Point3::new(0.0, 0.0, z),
            normal: Vector3::z_axis(),
        }
    }

    pub fn yz(x: f64) -> Self {
        Self {
            point: Point3::new(x, 0.0, 0.0),
            normal: Vector3::x_axis(),
        }
    }

    pub fn zx(y: f64) -> Self {
        Self {
            point: Point3::new(0.0, y, 0.0),
            normal: Vector3::y_axis(),
        }
    }

    /// Signed distance of `point` from the plane
    pub fn signed_distance(&self, point: [f64; 3]) -> f64 {
        (Point3::from(point) - self.point).dot(&self.normal)
    }

    /// True when `point` lies within `tolerance` of the plane
    pub fn contains(&self, point: [f64; 3], tolerance: f64) -> bool {
        self.signed_distance(point).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_signed_distance() {
        let plane = Plane::new([0.0, 0.0, 1.0], [0.0, 0.0, 2.0]).unwrap();
        assert_relative_eq!(plane.signed_distance([5.0, 3.0, 4.0]), 3.0);
        assert_relative_eq!(plane.signed_distance([0.0, 0.0, 0.0]), -1.0);
    }

    #[test]
    fn test_contains() {
        let plane = Plane::xy(0.0);
        assert!(plane.contains([10.0, 10.0, 0.0005], 1e-3));
        assert!(!plane.contains([10.0, 10.0, 0.01], 1e-3));
    }

    #[test]
    fn test_zero_normal_rejected() {
        assert!(Plane::new([0.0; 3], [0.0; 3]).is_err());
    }
}
