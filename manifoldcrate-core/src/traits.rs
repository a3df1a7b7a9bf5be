//! Core traits for manifoldcrate

use crate::{bounds::Bounds3, mesh::*, point::*};

/// Trait for drawable/renderable objects
///
/// A viewer frames its camera from these two summaries and never mutates the
/// object it draws.
pub trait Drawable {
    /// Get the axis-aligned bounding box of the object
    fn bounds(&self) -> Bounds3;

    /// Extent of the bounding box along each axis
    fn bounding_box_size(&self) -> Vector3f {
        self.bounds().size()
    }

    /// Center point of the bounding box
    fn bounding_box_centroid(&self) -> Point3f {
        self.bounds().centroid()
    }
}

impl Drawable for PolygonMesh {
    fn bounds(&self) -> Bounds3 {
        Bounds3::from_points(&self.vertices)
    }
}
