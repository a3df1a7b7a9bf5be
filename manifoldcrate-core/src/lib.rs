//! Core data structures and traits for manifoldcrate
//!
//! This crate provides the fundamental types shared by the simplification,
//! I/O and command-line crates: points and vectors, the polygon feed that
//! mesh construction consumes, the bounding volume tracker and the error type.

pub mod point;
pub mod mesh;
pub mod bounds;
pub mod traits;
pub mod shapes;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use bounds::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
