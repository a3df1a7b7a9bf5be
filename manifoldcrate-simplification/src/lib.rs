//! Mesh simplification by edge collapse
//!
//! This crate turns a closed polygon surface into a half-edge mesh and
//! reduces it by repeatedly contracting the cheapest safe edge:
//! - Half-edge storage in stable-slot arenas with batch compaction
//! - The collapse operator and the link condition guarding it
//! - Pluggable per-vertex error metrics
//! - Structural verification of every mesh invariant

pub mod arena;
pub mod halfedge;
pub mod builder;
pub mod collapse;
pub mod quadric_error;
pub mod edge_collapse;
pub mod verify;

pub use arena::{EdgeId, EntityId, FaceId, HalfEdgeId, VertexId};
pub use halfedge::*;
pub use collapse::*;
pub use quadric_error::*;
pub use edge_collapse::*;
pub use verify::*;

use manifoldcrate_core::{PolygonMesh, Result};

/// Simplify a mesh by reducing the number of faces
pub trait MeshSimplifier {
    /// Simplify `mesh` toward `target`, reporting how far it got
    fn simplify(&self, mesh: &PolygonMesh, target: SimplifyTarget) -> Result<SimplifiedMesh>;
}
