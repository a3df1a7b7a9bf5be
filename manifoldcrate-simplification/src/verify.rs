//! Structural self-check of a half-edge mesh

use crate::arena::{EntityId, FaceId, HalfEdgeId, VertexId};
use crate::halfedge::HalfEdgeMesh;
use crate::quadric_error::ErrorMetric;
use std::collections::HashSet;
use thiserror::Error;

/// First broken invariant found by [`HalfEdgeMesh::verify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{from} refers to dead {to}")]
    DeadReference { from: String, to: String },

    #[error("flip of {0} does not lead back to it")]
    FlipMismatch(HalfEdgeId),

    #[error("{0} starts and ends at the same vertex")]
    Loop(HalfEdgeId),

    #[error("next/prev links around {0} disagree")]
    LinkMismatch(HalfEdgeId),

    #[error("{0} is not followed by a half-edge leaving its target")]
    BrokenChain(HalfEdgeId),

    #[error("{0} and its successor belong to different faces")]
    FaceMismatch(HalfEdgeId),

    #[error("{0} and its flip name different edges, or their edge names neither")]
    EdgeMismatch(HalfEdgeId),

    #[error("stored half-edge of {0} does not belong to it")]
    OwnerMismatch(String),

    #[error("perimeter of {0} does not close")]
    OpenFace(FaceId),

    #[error("{face} has {degree} sides")]
    FaceTooSmall { face: FaceId, degree: usize },

    #[error("{vertex} has {degree} edges")]
    VertexTooSmall { vertex: VertexId, degree: usize },

    #[error("faces around {0} do not form a single fan")]
    SplitFan(VertexId),

    #[error("{a} and {b} are joined by more than one edge")]
    DuplicateEdge { a: VertexId, b: VertexId },

    #[error("face counter is {counted} but {live} faces are alive")]
    FaceCount { counted: usize, live: usize },
}

impl<Q: ErrorMetric> HalfEdgeMesh<Q> {
    /// Check every structural invariant of a closed oriented 2-manifold.
    ///
    /// Walks the whole mesh. Simplification runs this after finishing in
    /// debug builds.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        self.verify_half_edges()?;
        self.verify_faces()?;
        self.verify_edges()?;
        self.verify_vertices()?;

        let live = self.faces.live_count();
        if live != self.live_faces {
            return Err(InvariantViolation::FaceCount {
                counted: self.live_faces,
                live,
            });
        }
        Ok(())
    }

    fn verify_half_edges(&self) -> Result<(), InvariantViolation> {
        for (h, he) in self.half_edges.iter() {
            let dead = |name: &str, to: String| InvariantViolation::DeadReference {
                from: format!("{h}.{name}"),
                to,
            };
            if !self.half_edges.is_alive(he.next) {
                return Err(dead("next", he.next.to_string()));
            }
            if !self.half_edges.is_alive(he.prev) {
                return Err(dead("prev", he.prev.to_string()));
            }
            if !self.half_edges.is_alive(he.flip) {
                return Err(dead("flip", he.flip.to_string()));
            }
            if !self.vertices.is_alive(he.vertex) {
                return Err(dead("vertex", he.vertex.to_string()));
            }
            if !self.edges.is_alive(he.edge) {
                return Err(dead("edge", he.edge.to_string()));
            }
            if !self.faces.is_alive(he.face) {
                return Err(dead("face", he.face.to_string()));
            }

            let flip = &self.half_edges[he.flip];
            if he.flip == h || flip.flip != h {
                return Err(InvariantViolation::FlipMismatch(h));
            }
            if flip.vertex == he.vertex {
                return Err(InvariantViolation::Loop(h));
            }
            if self.half_edges[he.next].prev != h || self.half_edges[he.prev].next != h {
                return Err(InvariantViolation::LinkMismatch(h));
            }
            if self.half_edges[he.next].vertex != flip.vertex {
                return Err(InvariantViolation::BrokenChain(h));
            }
            if self.half_edges[he.next].face != he.face {
                return Err(InvariantViolation::FaceMismatch(h));
            }
            let primary = self.edges[he.edge].half_edge;
            if flip.edge != he.edge || (primary != h && primary != he.flip) {
                return Err(InvariantViolation::EdgeMismatch(h));
            }
        }
        Ok(())
    }

    fn verify_faces(&self) -> Result<(), InvariantViolation> {
        let budget = self.half_edges.slot_count();
        for (f, face) in self.faces.iter() {
            let start = face.half_edge;
            if !self.half_edges.is_alive(start) || self.half_edges[start].face != f {
                return Err(InvariantViolation::OwnerMismatch(f.to_string()));
            }

            let mut degree = 1;
            let mut h = self.half_edges[start].next;
            while h != start {
                if degree > budget {
                    return Err(InvariantViolation::OpenFace(f));
                }
                degree += 1;
                h = self.half_edges[h].next;
            }
            if degree < 3 {
                return Err(InvariantViolation::FaceTooSmall { face: f, degree });
            }
        }
        Ok(())
    }

    fn verify_edges(&self) -> Result<(), InvariantViolation> {
        for (e, edge) in self.edges.iter() {
            if !self.half_edges.is_alive(edge.half_edge) || self.half_edges[edge.half_edge].edge != e {
                return Err(InvariantViolation::OwnerMismatch(e.to_string()));
            }
        }
        Ok(())
    }

    fn verify_vertices(&self) -> Result<(), InvariantViolation> {
        let mut outgoing = vec![0usize; self.vertices.slot_count()];
        for (_, he) in self.half_edges.iter() {
            outgoing[he.vertex.index()] += 1;
        }

        for (v, vertex) in self.vertices.iter() {
            let h = vertex.half_edge;
            if !self.half_edges.is_alive(h) || self.half_edges[h].vertex != v {
                return Err(InvariantViolation::OwnerMismatch(v.to_string()));
            }

            let mut ring = HashSet::new();
            for h in self.outgoing(v) {
                let b = self.target(h);
                if !ring.insert(b) {
                    return Err(InvariantViolation::DuplicateEdge { a: v, b });
                }
            }
            if ring.len() != outgoing[v.index()] {
                return Err(InvariantViolation::SplitFan(v));
            }
            if ring.len() < 3 {
                return Err(InvariantViolation::VertexTooSmall {
                    vertex: v,
                    degree: ring.len(),
                });
            }
        }
        Ok(())
    }

    /// Undirected vertex pairs joined by more than one live edge
    pub fn duplicate_edges(&self) -> Vec<(VertexId, VertexId)> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for e in self.edges.ids() {
            let (a, b) = self.edge_endpoints(e);
            if !seen.insert((a.min(b), a.max(b))) {
                duplicates.push((a, b));
            }
        }
        duplicates
    }
}
