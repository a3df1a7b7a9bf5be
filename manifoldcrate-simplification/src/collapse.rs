//! Edge collapse and the link condition guarding it

use crate::arena::{EdgeId, FaceId, HalfEdgeId, VertexId};
use crate::halfedge::HalfEdgeMesh;
use crate::quadric_error::ErrorMetric;
use std::collections::HashSet;

/// What a single collapse did to the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Endpoint that absorbed the other
    pub survivor: VertexId,
    /// Endpoint that was tombstoned
    pub removed: VertexId,
    /// Triangles adjacent to the edge that vanished (0, 1 or 2)
    pub faces_removed: usize,
}

impl<Q: ErrorMetric> HalfEdgeMesh<Q> {
    /// Contract `e`, merging its second endpoint into its first.
    ///
    /// Triangles on either side of the edge disappear together with the
    /// edge opposite the survivor; larger polygons just lose one side.
    /// Positions and metrics are left untouched. The operation cannot be
    /// undone, and callers must check [`HalfEdgeMesh::is_collapse_safe`]
    /// first: collapsing an unsafe edge corrupts the topology.
    pub fn collapse_edge(&mut self, e: EdgeId) -> CollapseOutcome {
        let h = self.edges[e].half_edge;
        let t = self.half_edges[h].flip;
        let survivor = self.half_edges[h].vertex;
        let removed = self.half_edges[t].vertex;

        // h.prev ends at the survivor and is never deleted, so its flip
        // remains a valid outgoing half-edge
        let prev = self.half_edges[h].prev;
        self.vertices[survivor].half_edge = self.half_edges[prev].flip;

        let condemned: Vec<HalfEdgeId> = self.outgoing(removed).collect();
        for he in condemned {
            self.half_edges[he].vertex = survivor;
        }

        self.vertices[removed].alive = false;
        self.edges[e].alive = false;

        let faces_removed = self.detach(h, true) + self.detach(t, false);
        self.live_faces -= faces_removed;

        CollapseOutcome {
            survivor,
            removed,
            faces_removed,
        }
    }

    /// Take `x` out of its face. Returns 1 if the face was a triangle and
    /// vanished with it.
    ///
    /// `leaves_survivor` is true when `x` runs from the survivor to the
    /// removed vertex.
    fn detach(&mut self, x: HalfEdgeId, leaves_survivor: bool) -> usize {
        let next = self.half_edges[x].next;
        let prev = self.half_edges[x].prev;
        let face = self.half_edges[x].face;
        self.half_edges[x].alive = false;

        if self.half_edges[next].next != prev {
            self.half_edges[prev].next = next;
            self.half_edges[next].prev = prev;
            if self.faces[face].half_edge == x {
                self.faces[face].half_edge = next;
            }
            return 0;
        }

        // The side touching the survivor is kept, the other is merged into it
        let (keep, drop) = if leaves_survivor { (prev, next) } else { (next, prev) };
        let keep_outer = self.half_edges[keep].flip;
        let drop_outer = self.half_edges[drop].flip;
        let keep_edge = self.half_edges[keep].edge;
        let drop_edge = self.half_edges[drop].edge;

        self.half_edges[keep_outer].flip = drop_outer;
        self.half_edges[drop_outer].flip = keep_outer;
        self.half_edges[drop_outer].edge = keep_edge;
        self.edges[keep_edge].half_edge = keep_outer;
        self.edges[drop_edge].alive = false;

        let apex = self.half_edges[prev].vertex;
        self.vertices[apex].half_edge = self.half_edges[next].flip;

        self.half_edges[next].alive = false;
        self.half_edges[prev].alive = false;
        self.faces[face].alive = false;
        1
    }

    /// Corner opposite `h` if its face is a triangle
    fn triangle_apex(&self, h: HalfEdgeId) -> Option<VertexId> {
        let next = self.half_edges[h].next;
        let prev = self.half_edges[h].prev;
        (self.half_edges[next].next == prev).then(|| self.half_edges[prev].vertex)
    }

    /// Link condition: whether collapsing `e` keeps the surface a manifold
    /// without duplicate edges or degenerate faces.
    ///
    /// With `a`, `b` the endpoints and `F1`, `F2` the faces beside the edge,
    /// the collapse is rejected when
    /// 1. `F1` and `F2` are triangles with the same apex,
    /// 2. `a` and `b` share a neighbor that is not the apex of a triangle
    ///    beside the edge (its two edges to `a` and `b` would coincide),
    /// 3. a triangle apex has degree 3 or less (it would be left with two
    ///    edges whose faces share both of them),
    /// 4. the merged vertex would have fewer than three edges, or
    /// 5. a face other than `F1`, `F2` contains both `a` and `b` (it would
    ///    list the merged vertex twice).
    pub fn is_collapse_safe(&self, e: EdgeId) -> bool {
        if !self.edges.is_alive(e) {
            return false;
        }
        let h = self.edges[e].half_edge;
        let t = self.half_edges[h].flip;
        let a = self.half_edges[h].vertex;
        let b = self.half_edges[t].vertex;
        let f1 = self.half_edges[h].face;
        let f2 = self.half_edges[t].face;
        if f1 == f2 {
            return false;
        }

        let apex1 = self.triangle_apex(h);
        let apex2 = self.triangle_apex(t);
        if apex1.is_some() && apex1 == apex2 {
            return false;
        }

        let apexes: Vec<VertexId> = apex1.into_iter().chain(apex2).collect();
        if apexes.iter().any(|&c| self.vertex_degree(c) <= 3) {
            return false;
        }

        let ring_a: HashSet<VertexId> = self.neighbors(a).collect();
        let mut degree_b = 0;
        for w in self.neighbors(b) {
            degree_b += 1;
            if w != a && ring_a.contains(&w) && !apexes.contains(&w) {
                return false;
            }
        }
        if ring_a.len() + degree_b < 5 + apexes.len() {
            return false;
        }

        let faces_a: HashSet<FaceId> = self.outgoing(a).map(|he| self.face_of(he)).collect();
        !self
            .outgoing(b)
            .map(|he| self.face_of(he))
            .any(|f| f != f1 && f != f2 && faces_a.contains(&f))
    }
}
