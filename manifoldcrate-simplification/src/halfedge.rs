//! Half-edge mesh
//!
//! Every undirected edge is stored once as an [`Edge`] and twice as directed
//! [`HalfEdge`]s, one per adjacent face. A half-edge knows the half-edge that
//! follows and precedes it around its face (`next`/`prev`), the opposite
//! direction of its edge (`flip`), the vertex it leaves (`vertex`), its edge
//! and its face. All references are ids into the mesh's arenas, so the cyclic
//! graph is owned in one place and entities are retired by tombstoning.
//!
//! Walking `flip.next` from any half-edge leaving a vertex visits every
//! half-edge leaving that vertex; walking `next` visits a face's perimeter.

use crate::arena::{Arena, EdgeId, EntityId, FaceId, HalfEdgeId, Tombstone, VertexId};
use crate::quadric_error::{ErrorMetric, IsotropicQuadric};
use itertools::Itertools;
use manifoldcrate_core::{safe_normalize, Bounds3, Drawable, Point3f, PolygonMesh, Vector3f};

#[derive(Debug, Clone)]
pub struct Vertex<Q> {
    pub(crate) position: Point3f,
    pub(crate) metric: Q,
    /// One half-edge leaving this vertex
    pub(crate) half_edge: HalfEdgeId,
    pub(crate) alive: bool,
}

#[derive(Debug, Clone)]
pub struct Edge {
    /// Primary direction; its origin survives when the edge is collapsed
    pub(crate) half_edge: HalfEdgeId,
    /// Queued cost is stale
    pub(crate) dirty: bool,
    /// Rejected by the link condition and waiting for a nearby collapse
    pub(crate) unsafe_collapse: bool,
    pub(crate) alive: bool,
}

#[derive(Debug, Clone)]
pub struct Face {
    pub(crate) half_edge: HalfEdgeId,
    pub(crate) alive: bool,
}

#[derive(Debug, Clone)]
pub struct HalfEdge {
    pub(crate) next: HalfEdgeId,
    pub(crate) prev: HalfEdgeId,
    pub(crate) flip: HalfEdgeId,
    pub(crate) vertex: VertexId,
    pub(crate) edge: EdgeId,
    pub(crate) face: FaceId,
    pub(crate) alive: bool,
}

impl<Q> Tombstone for Vertex<Q> {
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Tombstone for Edge {
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Tombstone for Face {
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Tombstone for HalfEdge {
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl<Q> Vertex<Q> {
    pub fn position(&self) -> Point3f {
        self.position
    }

    pub fn metric(&self) -> &Q {
        &self.metric
    }
}

impl Edge {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_unsafe(&self) -> bool {
        self.unsafe_collapse
    }
}

/// Closed polygon surface stored as a half-edge graph.
///
/// The mesh exclusively owns its vertices, edges, faces and half-edges.
/// The error metric `Q` is kept per vertex and drives simplification.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<Q = IsotropicQuadric> {
    pub(crate) vertices: Arena<VertexId, Vertex<Q>>,
    pub(crate) edges: Arena<EdgeId, Edge>,
    pub(crate) faces: Arena<FaceId, Face>,
    pub(crate) half_edges: Arena<HalfEdgeId, HalfEdge>,
    /// Extent of every input position, fixed at construction
    pub(crate) bounds: Bounds3,
    pub(crate) live_faces: usize,
}

impl<Q: ErrorMetric> HalfEdgeMesh<Q> {
    // ---- Counts ----

    pub fn vertex_count(&self) -> usize {
        self.vertices.live_count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.live_count()
    }

    pub fn face_count(&self) -> usize {
        self.live_faces
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.live_count()
    }

    // ---- Entity access ----

    pub fn vertex(&self, v: VertexId) -> &Vertex<Q> {
        &self.vertices[v]
    }

    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e]
    }

    pub fn position(&self, v: VertexId) -> Point3f {
        self.vertices[v].position
    }

    pub fn metric(&self, v: VertexId) -> &Q {
        &self.vertices[v].metric
    }

    pub fn is_vertex_alive(&self, v: VertexId) -> bool {
        self.vertices.is_alive(v)
    }

    pub fn is_edge_alive(&self, e: EdgeId) -> bool {
        self.edges.is_alive(e)
    }

    pub fn is_face_alive(&self, f: FaceId) -> bool {
        self.faces.is_alive(f)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.ids()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.ids()
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.ids()
    }

    // ---- Half-edge navigation ----

    #[inline]
    pub fn origin(&self, h: HalfEdgeId) -> VertexId {
        self.half_edges[h].vertex
    }

    #[inline]
    pub fn target(&self, h: HalfEdgeId) -> VertexId {
        self.half_edges[self.half_edges[h].flip].vertex
    }

    #[inline]
    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h].next
    }

    #[inline]
    pub fn prev(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h].prev
    }

    #[inline]
    pub fn flip(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h].flip
    }

    #[inline]
    pub fn face_of(&self, h: HalfEdgeId) -> FaceId {
        self.half_edges[h].face
    }

    #[inline]
    pub fn edge_of(&self, h: HalfEdgeId) -> EdgeId {
        self.half_edges[h].edge
    }

    /// Half-edges leaving `v`, following `flip.next`
    pub fn outgoing(&self, v: VertexId) -> Circulator<'_, Q> {
        Circulator::new(self, self.vertices[v].half_edge, Step::AroundVertex)
    }

    /// Perimeter of `f`, following `next`
    pub fn face_loop(&self, f: FaceId) -> Circulator<'_, Q> {
        Circulator::new(self, self.faces[f].half_edge, Step::AroundFace)
    }

    /// One-ring of `v`
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.outgoing(v).map(move |h| self.target(h))
    }

    /// Number of edges incident to `v`
    pub fn vertex_degree(&self, v: VertexId) -> usize {
        self.outgoing(v).count()
    }

    /// Number of sides of `f`
    pub fn face_degree(&self, f: FaceId) -> usize {
        self.face_loop(f).count()
    }

    /// Corners of `f` in winding order
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_loop(f).map(move |h| self.origin(h))
    }

    /// Endpoints of `e`; the first is the one kept by a collapse
    pub fn edge_endpoints(&self, e: EdgeId) -> (VertexId, VertexId) {
        let h = self.edges[e].half_edge;
        (self.origin(h), self.target(h))
    }

    /// Live edge joining `a` and `b`, if any
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.outgoing(a)
            .find(|&h| self.target(h) == b)
            .map(|h| self.edge_of(h))
    }

    // ---- Read-only draw contract ----

    /// Live faces with their perimeter positions and normal
    pub fn faces(&self) -> impl Iterator<Item = FaceView<'_, Q>> + '_ {
        self.faces.ids().map(move |id| FaceView { mesh: self, id })
    }

    /// Live edges with their endpoint positions
    pub fn edges(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.edges.ids().map(move |id| {
            let (a, b) = self.edge_endpoints(id);
            EdgeView {
                id,
                a: self.position(a),
                b: self.position(b),
            }
        })
    }

    /// Live vertex positions
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, Point3f)> + '_ {
        self.vertices.iter().map(|(id, v)| (id, v.position))
    }

    /// Export the current surface as an indexed polygon list.
    ///
    /// Vertices are numbered in slot order, faces start at their stored
    /// half-edge and keep their winding.
    pub fn to_polygon_mesh(&self) -> PolygonMesh {
        let mut index = vec![usize::MAX; self.vertices.slot_count()];
        let mut vertices = Vec::with_capacity(self.vertices.slot_count());
        for (id, v) in self.vertices.iter() {
            index[id.index()] = vertices.len();
            vertices.push(v.position);
        }

        let faces = self
            .faces
            .ids()
            .map(|f| self.face_vertices(f).map(|v| index[v.index()]).collect())
            .collect();

        PolygonMesh::from_vertices_and_faces(vertices, faces)
    }

    // ---- Lifecycle ----

    /// Remove every tombstoned entity and rewrite all references.
    ///
    /// Ids obtained before this call are invalid afterwards.
    pub fn compact(&mut self) {
        let vertex_map = self.vertices.compact();
        let edge_map = self.edges.compact();
        let face_map = self.faces.compact();
        let half_edge_map = self.half_edges.compact();

        for v in self.vertices.slots_mut() {
            v.half_edge = half_edge_map.get(v.half_edge);
        }
        for e in self.edges.slots_mut() {
            e.half_edge = half_edge_map.get(e.half_edge);
        }
        for f in self.faces.slots_mut() {
            f.half_edge = half_edge_map.get(f.half_edge);
        }
        for h in self.half_edges.slots_mut() {
            h.next = half_edge_map.get(h.next);
            h.prev = half_edge_map.get(h.prev);
            h.flip = half_edge_map.get(h.flip);
            h.vertex = vertex_map.get(h.vertex);
            h.edge = edge_map.get(h.edge);
            h.face = face_map.get(h.face);
        }
    }
}

impl<Q: ErrorMetric> Drawable for HalfEdgeMesh<Q> {
    fn bounds(&self) -> Bounds3 {
        self.bounds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AroundVertex,
    AroundFace,
}

/// Iterator over a closed half-edge cycle.
///
/// The walk is capped at the number of half-edge slots so a corrupted cycle
/// ends instead of spinning.
pub struct Circulator<'a, Q> {
    mesh: &'a HalfEdgeMesh<Q>,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
    step: Step,
    budget: usize,
}

impl<'a, Q> Circulator<'a, Q> {
    fn new(mesh: &'a HalfEdgeMesh<Q>, start: HalfEdgeId, step: Step) -> Self {
        Self {
            mesh,
            start,
            current: start.is_valid().then_some(start),
            step,
            budget: mesh.half_edges.slot_count(),
        }
    }
}

impl<Q> Iterator for Circulator<'_, Q> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        if self.budget == 0 {
            self.current = None;
            return None;
        }
        self.budget -= 1;

        let he = &self.mesh.half_edges[current];
        let following = match self.step {
            Step::AroundVertex => self.mesh.half_edges[he.flip].next,
            Step::AroundFace => he.next,
        };
        self.current = (following != self.start).then_some(following);
        Some(current)
    }
}

/// Read-only view of one face
pub struct FaceView<'a, Q> {
    mesh: &'a HalfEdgeMesh<Q>,
    id: FaceId,
}

impl<'a, Q: ErrorMetric> FaceView<'a, Q> {
    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn degree(&self) -> usize {
        self.mesh.face_degree(self.id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + 'a {
        self.mesh.face_vertices(self.id)
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3f> + 'a {
        let mesh = self.mesh;
        mesh.face_vertices(self.id).map(move |v| mesh.position(v))
    }

    /// Unit normal by Newell's method; zero for a degenerate face
    pub fn normal(&self) -> Vector3f {
        let corners: Vec<Point3f> = self.positions().collect();
        let mut n = Vector3f::zeros();
        for (p, q) in corners.iter().circular_tuple_windows() {
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        safe_normalize(n)
    }

    pub fn centroid(&self) -> Point3f {
        let mut sum = Vector3f::zeros();
        let mut count = 0usize;
        for p in self.positions() {
            sum += p.coords;
            count += 1;
        }
        Point3f::from(sum / count.max(1) as f32)
    }
}

/// Read-only view of one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView {
    pub id: EdgeId,
    pub a: Point3f,
    pub b: Point3f,
}

impl EdgeView {
    pub fn midpoint(&self) -> Point3f {
        Point3f::from((self.a.coords + self.b.coords) / 2.0)
    }
}
