//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Normalize `v`, returning the zero vector when it is too short to normalize.
///
/// Degenerate faces (collinear or coincident corners) produce a zero-length
/// cross product; nalgebra's `normalize` would turn that into NaNs.
pub fn safe_normalize(v: Vector3f) -> Vector3f {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
}

/// Widen a single precision point for accumulation.
#[inline]
pub fn to_f64(p: &Point3f) -> Vector3d {
    Vector3d::new(p.x as f64, p.y as f64, p.z as f64)
}

/// Narrow an accumulated position back to a mesh point.
#[inline]
pub fn to_point3f(v: &Vector3d) -> Point3f {
    Point3f::new(v.x as f32, v.y as f32, v.z as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_safe_normalize_unit_length() {
        let n = safe_normalize(Vector3f::new(3.0, 0.0, 4.0));
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(n.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_safe_normalize_zero() {
        let n = safe_normalize(Vector3f::zeros());
        assert_eq!(n, Vector3f::zeros());
        assert!(n.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_precision_conversion() {
        let p = Point3f::new(1.5, -2.25, 8.0);
        assert_eq!(to_point3f(&to_f64(&p)), p);
    }
}
