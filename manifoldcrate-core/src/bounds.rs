//! Axis-aligned bounding volume accumulation

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Per-axis running min/max over a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min: Point3f,
    pub max: Point3f,
}

impl Bounds3 {
    /// An accumulator that has seen no samples
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut bounds = Self::empty();
        for p in points {
            bounds.add_point(p);
        }
        bounds
    }

    pub fn add_point(&mut self, p: &Point3f) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);

        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Extent along each axis; zero when empty
    pub fn size(&self) -> Vector3f {
        if self.is_empty() {
            return Vector3f::zeros();
        }
        self.max - self.min
    }

    /// Midpoint along each axis; the origin when empty
    pub fn centroid(&self) -> Point3f {
        if self.is_empty() {
            return Point3f::origin();
        }
        Point3f::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_bounds() {
        let b = Bounds3::empty();
        assert!(b.is_empty());
        assert_eq!(b.size(), Vector3f::zeros());
        assert_eq!(b.centroid(), Point3f::origin());
    }

    #[test]
    fn test_single_point() {
        let b = Bounds3::from_points(&[Point3f::new(2.0, -1.0, 3.0)]);
        assert!(!b.is_empty());
        assert_eq!(b.size(), Vector3f::zeros());
        assert_eq!(b.centroid(), Point3f::new(2.0, -1.0, 3.0));
    }

    #[test]
    fn test_negative_coordinates() {
        // All samples below zero must still move the upper bound
        let b = Bounds3::from_points(&[
            Point3f::new(-4.0, -3.0, -2.0),
            Point3f::new(-2.0, -1.0, -1.0),
        ]);
        let size = b.size();
        assert_relative_eq!(size.x, 2.0);
        assert_relative_eq!(size.y, 2.0);
        assert_relative_eq!(size.z, 1.0);
        let c = b.centroid();
        assert_relative_eq!(c.x, -3.0);
        assert_relative_eq!(c.y, -2.0);
        assert_relative_eq!(c.z, -1.5);
    }
}
