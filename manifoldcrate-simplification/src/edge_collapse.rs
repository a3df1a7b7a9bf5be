//! Edge collapse simplification
//!
//! Greedy cheapest-first contraction of edges on a closed half-edge mesh.
//! Collapse costs come from the per-vertex error metric. The queue is a plain
//! binary heap: instead of updating entries in place, edges whose cost went
//! stale are flagged `dirty` and re-queued when popped, and entries for edges
//! removed in the meantime are dropped on sight.

use crate::arena::EdgeId;
use crate::halfedge::HalfEdgeMesh;
use crate::quadric_error::{collapse_target, ErrorMetric, IsotropicQuadric};
use crate::MeshSimplifier;
use manifoldcrate_core::{Error, Point3f, PolygonMesh, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use tracing::{debug, info};

// ============================================================
// Edge Cost for Priority Queue
// ============================================================

#[derive(Debug, Clone, Copy)]
struct EdgeCost {
    edge: EdgeId,
    cost: f64,
}

impl PartialEq for EdgeCost {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}
impl Eq for EdgeCost {}

impl PartialOrd for EdgeCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other.cost.total_cmp(&self.cost)
    }
}

// ============================================================
// Simplification run
// ============================================================

/// Outcome of one [`HalfEdgeMesh::simplify`] run.
///
/// Running out of safe edges before the target is met is not an error; it
/// shows up here as `achieved_faces > target_faces`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimplifyReport {
    /// Faces before the run
    pub initial_faces: usize,
    /// Requested face count
    pub target_faces: usize,
    /// Faces after the run
    pub achieved_faces: usize,
    /// Edge collapses performed
    pub collapses: usize,
    /// Candidates rejected by the link condition
    pub unsafe_rejections: usize,
    /// Queue entries dropped because their edge was already gone
    pub stale_entries: usize,
    /// Queue entries re-pushed with a recomputed cost
    pub requeued: usize,
}

impl SimplifyReport {
    fn unchanged(faces: usize, target_faces: usize) -> Self {
        Self {
            initial_faces: faces,
            target_faces,
            achieved_faces: faces,
            collapses: 0,
            unsafe_rejections: 0,
            stale_entries: 0,
            requeued: 0,
        }
    }

    /// Whether the face count got down to the target
    pub fn reached_target(&self) -> bool {
        self.achieved_faces <= self.target_faces
    }

    pub fn faces_removed(&self) -> usize {
        self.initial_faces - self.achieved_faces
    }

    /// Percentage of the initial faces removed
    pub fn reduction_percent(&self) -> f64 {
        if self.initial_faces == 0 {
            0.0
        } else {
            self.faces_removed() as f64 / self.initial_faces as f64 * 100.0
        }
    }
}

impl fmt::Display for SimplifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simplification: {} -> {} faces (target {}, {:.1}% reduction, {} collapses, {} unsafe rejections)",
            self.initial_faces,
            self.achieved_faces,
            self.target_faces,
            self.reduction_percent(),
            self.collapses,
            self.unsafe_rejections
        )?;
        if !self.reached_target() {
            write!(f, " [target unreachable]")?;
        }
        Ok(())
    }
}

impl<Q: ErrorMetric> HalfEdgeMesh<Q> {
    /// Where collapsing `e` would put the merged vertex, and at what cost
    pub fn edge_collapse_cost(&self, e: EdgeId) -> (Point3f, f64) {
        let (a, b) = self.edge_endpoints(e);
        let (va, vb) = (&self.vertices[a], &self.vertices[b]);
        collapse_target(&va.metric, &vb.metric, &va.position, &vb.position)
    }

    fn queue_entry(&self, edge: EdgeId) -> EdgeCost {
        EdgeCost {
            edge,
            cost: self.edge_collapse_cost(edge).1,
        }
    }

    /// Collapse edges cheapest first until at most `target_faces` faces remain
    /// or no safe edge is left.
    ///
    /// A collapse removes up to two faces at once, so an all-triangle mesh
    /// can end one face below an odd target. The mesh is compacted when the
    /// run ends; ids obtained earlier are invalid afterwards.
    pub fn simplify(&mut self, target_faces: usize) -> SimplifyReport {
        let initial_faces = self.face_count();
        if initial_faces <= target_faces {
            debug!(faces = initial_faces, target_faces, "Face count already at target");
            return SimplifyReport::unchanged(initial_faces, target_faces);
        }

        info!(
            initial = initial_faces,
            target = target_faces,
            "Starting edge collapse simplification"
        );

        let mut report = SimplifyReport::unchanged(initial_faces, target_faces);
        for edge in self.edges.slots_mut() {
            edge.dirty = false;
            edge.unsafe_collapse = false;
        }
        let mut queue: BinaryHeap<EdgeCost> = self.edges.ids().map(|e| self.queue_entry(e)).collect();

        while self.face_count() > target_faces {
            let Some(EdgeCost { edge: e, cost }) = queue.pop() else {
                debug!(faces = self.face_count(), "Queue exhausted before reaching target");
                break;
            };

            if !self.edges.is_alive(e) {
                report.stale_entries += 1;
                continue;
            }

            if self.edges[e].dirty {
                self.edges[e].dirty = false;
                queue.push(self.queue_entry(e));
                report.requeued += 1;
                continue;
            }

            if !self.is_collapse_safe(e) {
                self.edges[e].unsafe_collapse = true;
                report.unsafe_rejections += 1;
                debug!(edge = %e, cost, "Rejected unsafe collapse");
                continue;
            }

            let (a, b) = self.edge_endpoints(e);
            let merged = self.vertices[a].metric.combine(&self.vertices[b].metric);
            let (position, _) = self.edge_collapse_cost(e);

            let outcome = self.collapse_edge(e);
            let survivor = &mut self.vertices[outcome.survivor];
            survivor.position = position;
            survivor.metric = merged;
            report.collapses += 1;

            let incident: Vec<EdgeId> = self
                .outgoing(outcome.survivor)
                .map(|h| self.edge_of(h))
                .collect();
            for edge in incident {
                let state = &mut self.edges[edge];
                state.dirty = true;
                if state.unsafe_collapse {
                    state.unsafe_collapse = false;
                    queue.push(self.queue_entry(edge));
                }
            }
        }

        report.achieved_faces = self.face_count();
        self.compact();

        #[cfg(debug_assertions)]
        if let Err(violation) = self.verify() {
            panic!("mesh invariant violated after simplification: {violation}");
        }

        info!(
            final_faces = report.achieved_faces,
            collapses = report.collapses,
            rejected = report.unsafe_rejections,
            "Simplification complete"
        );
        report
    }
}

// ============================================================
// Polygon mesh facade
// ============================================================

/// How far a mesh should be simplified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimplifyTarget {
    /// Absolute face count
    Faces(usize),
    /// Fraction of faces to remove (0.0 = none, 1.0 = as many as possible)
    Reduction(f32),
}

impl SimplifyTarget {
    /// Face count this target asks for on a mesh with `faces` faces
    pub fn resolve(&self, faces: usize) -> Result<usize> {
        match *self {
            SimplifyTarget::Faces(target) => Ok(target),
            SimplifyTarget::Reduction(ratio) => {
                if !(0.0..=1.0).contains(&ratio) {
                    return Err(Error::InvalidData(
                        "Reduction ratio must be between 0.0 and 1.0".to_string(),
                    ));
                }
                Ok(((1.0 - ratio) * faces as f32) as usize)
            }
        }
    }
}

/// A simplified mesh together with the run that produced it.
#[derive(Debug, Clone)]
pub struct SimplifiedMesh {
    pub mesh: PolygonMesh,
    pub report: SimplifyReport,
}

/// Edge collapse mesh simplifier driven by the isotropic quadric.
///
/// Builds a half-edge mesh from the input, collapses edges cheapest first
/// under the link condition and exports the result.
#[derive(Debug, Clone, Default)]
pub struct EdgeCollapseSimplifier {
    /// Check every mesh invariant after simplifying, also in release builds
    pub verify: bool,
}

impl EdgeCollapseSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify(verify: bool) -> Self {
        Self { verify }
    }
}

impl MeshSimplifier for EdgeCollapseSimplifier {
    fn simplify(&self, mesh: &PolygonMesh, target: SimplifyTarget) -> Result<SimplifiedMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        let target_faces = target.resolve(mesh.face_count())?;

        let mut hem = HalfEdgeMesh::<IsotropicQuadric>::from_polygons(mesh)?;
        let report = hem.simplify(target_faces);
        if self.verify {
            hem.verify()
                .map_err(|violation| Error::Algorithm(violation.to_string()))?;
        }

        Ok(SimplifiedMesh {
            mesh: hem.to_polygon_mesh(),
            report,
        })
    }
}
