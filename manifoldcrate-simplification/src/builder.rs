//! Half-edge construction from an indexed polygon list

use crate::arena::{Arena, EdgeId, EntityId, FaceId, HalfEdgeId, VertexId, MAX_SLOTS};
use crate::halfedge::{Edge, Face, HalfEdge, HalfEdgeMesh, Vertex};
use crate::quadric_error::ErrorMetric;
use manifoldcrate_core::{Bounds3, Error, PolygonMesh, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Undirected edge lookup used while faces are being stitched together.
///
/// Endpoints move during simplification, so the map only lives for the
/// duration of one construction call.
type EdgeMap = HashMap<(VertexId, VertexId), EdgeId>;

impl<Q: ErrorMetric> HalfEdgeMesh<Q> {
    /// Build a linked half-edge mesh from vertex positions and polygons.
    ///
    /// The input must describe a closed, consistently wound 2-manifold:
    /// every edge is shared by exactly two faces which traverse it in
    /// opposite directions, and the faces around each vertex form a single
    /// fan. Any violation aborts construction with a descriptive error.
    /// Input positions referenced by no face are dropped.
    pub fn from_polygons(mesh: &PolygonMesh) -> Result<Self> {
        validate_faces(mesh)?;

        let corner_count: usize = mesh.faces.iter().map(Vec::len).sum();
        if corner_count > MAX_SLOTS || mesh.vertices.len() > MAX_SLOTS {
            return Err(Error::InvalidData(format!(
                "mesh with {} vertices and {corner_count} face corners exceeds the supported size",
                mesh.vertices.len()
            )));
        }

        let mut built = Self {
            vertices: Arena::with_capacity(mesh.vertices.len()),
            edges: Arena::with_capacity(corner_count / 2),
            faces: Arena::with_capacity(mesh.faces.len()),
            half_edges: Arena::with_capacity(corner_count),
            bounds: Bounds3::from_points(&mesh.vertices),
            live_faces: mesh.faces.len(),
        };

        for &position in &mesh.vertices {
            built.vertices.push(Vertex {
                position,
                metric: Q::default(),
                half_edge: HalfEdgeId::INVALID,
                alive: true,
            });
        }

        let mut edge_map = EdgeMap::with_capacity(corner_count / 2);
        let mut outgoing_counts = vec![0usize; mesh.vertices.len()];
        for polygon in &mesh.faces {
            built.add_face(polygon, &mut edge_map)?;
            for &corner in polygon {
                outgoing_counts[corner] += 1;
            }
        }
        drop(edge_map);

        built.check_closed()?;
        let dropped = built.drop_unreferenced_vertices();
        built.check_vertex_fans(&outgoing_counts)?;
        built.initialize_metrics();

        if dropped > 0 {
            warn!(dropped, "Dropped vertices not referenced by any face");
            built.compact();
        }

        debug!(
            vertices = built.vertex_count(),
            edges = built.edge_count(),
            faces = built.face_count(),
            "Built half-edge mesh"
        );
        Ok(built)
    }

    fn add_face(&mut self, polygon: &[usize], edge_map: &mut EdgeMap) -> Result<()> {
        let face = self.faces.push(Face {
            half_edge: HalfEdgeId::INVALID,
            alive: true,
        });

        let degree = polygon.len();
        let mut ring = Vec::with_capacity(degree);
        for i in 0..degree {
            let a = VertexId::from_index(polygon[i]);
            let b = VertexId::from_index(polygon[(i + 1) % degree]);
            let edge = self.lookup_edge(a, b, edge_map);

            let h = self.half_edges.push(HalfEdge {
                next: HalfEdgeId::INVALID,
                prev: HalfEdgeId::INVALID,
                flip: HalfEdgeId::INVALID,
                vertex: a,
                edge,
                face,
                alive: true,
            });

            let existing = self.edges[edge].half_edge;
            if existing.is_valid() {
                if self.half_edges[existing].flip.is_valid() {
                    return Err(Error::NonManifoldEdge {
                        a: a.index(),
                        b: b.index(),
                    });
                }
                if self.half_edges[existing].vertex == a {
                    return Err(Error::InconsistentOrientation {
                        a: a.index(),
                        b: b.index(),
                    });
                }
                self.half_edges[existing].flip = h;
                self.half_edges[h].flip = existing;
            } else {
                self.edges[edge].half_edge = h;
            }

            self.vertices[a].half_edge = h;
            ring.push(h);
        }

        for i in 0..degree {
            let h = ring[i];
            self.half_edges[h].next = ring[(i + 1) % degree];
            self.half_edges[h].prev = ring[(i + degree - 1) % degree];
        }
        self.faces[face].half_edge = ring[0];
        Ok(())
    }

    fn lookup_edge(&mut self, a: VertexId, b: VertexId, edge_map: &mut EdgeMap) -> EdgeId {
        let key = (a.min(b), a.max(b));
        *edge_map.entry(key).or_insert_with(|| {
            self.edges.push(Edge {
                half_edge: HalfEdgeId::INVALID,
                dirty: false,
                unsafe_collapse: false,
                alive: true,
            })
        })
    }

    /// Every half-edge must have found its opposite.
    fn check_closed(&self) -> Result<()> {
        for (h, he) in self.half_edges.iter() {
            if !he.flip.is_valid() {
                let b = self.half_edges[he.next].vertex;
                debug!(half_edge = %h, "Unpaired half-edge");
                return Err(Error::OpenBoundary {
                    a: he.vertex.index(),
                    b: b.index(),
                });
            }
        }
        Ok(())
    }

    fn drop_unreferenced_vertices(&mut self) -> usize {
        let mut dropped = 0;
        for v in self.vertices.slots_mut() {
            if !v.half_edge.is_valid() {
                v.alive = false;
                dropped += 1;
            }
        }
        dropped
    }

    /// A vertex whose faces form two or more fans is reached by fewer
    /// half-edges circulating from one of them than it has in total.
    fn check_vertex_fans(&self, outgoing_counts: &[usize]) -> Result<()> {
        for v in self.vertices.ids() {
            if self.vertex_degree(v) != outgoing_counts[v.index()] {
                return Err(Error::NonManifoldVertex { vertex: v.index() });
            }
        }
        Ok(())
    }

    pub(crate) fn initialize_metrics(&mut self) {
        let metrics: Vec<(VertexId, Q)> = self
            .vertices
            .ids()
            .map(|v| {
                let ring = self.neighbors(v).map(|n| self.position(n));
                (v, Q::from_one_ring(&self.position(v), ring))
            })
            .collect();
        for (v, metric) in metrics {
            self.vertices[v].metric = metric;
        }
    }
}

fn validate_faces(mesh: &PolygonMesh) -> Result<()> {
    let vertex_count = mesh.vertices.len();
    for (face, polygon) in mesh.faces.iter().enumerate() {
        if polygon.len() < 3 {
            return Err(Error::DegenerateFace {
                face,
                reason: format!("{} corners, at least 3 required", polygon.len()),
            });
        }
        for &index in polygon {
            if index >= vertex_count {
                return Err(Error::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        for (i, &index) in polygon.iter().enumerate() {
            if polygon[i + 1..].contains(&index) {
                return Err(Error::DegenerateFace {
                    face,
                    reason: format!("vertex {index} appears more than once"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadric_error::IsotropicQuadric;
    use manifoldcrate_core::{shapes, Point3f};

    type Mesh = HalfEdgeMesh<IsotropicQuadric>;

    #[test]
    fn test_quad_cube_counts() {
        let mesh = Mesh::from_polygons(&shapes::unit_cube_quads()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.edge_count(), 12);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.half_edge_count(), 24);
        assert!(mesh.verify().is_ok());
    }

    #[test]
    fn test_triangle_cube_counts() {
        let mesh = Mesh::from_polygons(&shapes::unit_cube()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.edge_count(), 18);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.verify().is_ok());
    }

    #[test]
    fn test_index_out_of_range() {
        let mut input = shapes::tetrahedron();
        input.faces[2][1] = 4;
        match Mesh::from_polygons(&input) {
            Err(Error::IndexOutOfRange {
                face: 2,
                index: 4,
                vertex_count: 4,
            }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_faces_rejected() {
        let mut input = shapes::tetrahedron();
        input.faces[0] = vec![0, 1];
        assert!(matches!(
            Mesh::from_polygons(&input),
            Err(Error::DegenerateFace { face: 0, .. })
        ));

        let mut input = shapes::tetrahedron();
        input.faces[1] = vec![0, 3, 0];
        assert!(matches!(
            Mesh::from_polygons(&input),
            Err(Error::DegenerateFace { face: 1, .. })
        ));
    }

    #[test]
    fn test_open_surface_rejected() {
        let mut input = shapes::tetrahedron();
        input.faces.pop();
        assert!(matches!(
            Mesh::from_polygons(&input),
            Err(Error::OpenBoundary { .. })
        ));
    }

    #[test]
    fn test_flipped_face_rejected() {
        let mut input = shapes::tetrahedron();
        input.faces[3].reverse();
        assert!(matches!(
            Mesh::from_polygons(&input),
            Err(Error::InconsistentOrientation { .. })
        ));
    }

    #[test]
    fn test_edge_shared_by_three_faces_rejected() {
        // Three triangles hinged on edge (0, 1)
        let input = PolygonMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, -1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![vec![0, 1, 2], vec![1, 0, 3], vec![0, 1, 4]],
        );
        assert!(matches!(
            Mesh::from_polygons(&input),
            Err(Error::NonManifoldEdge { a: 0, b: 1 })
        ));
    }

    #[test]
    fn test_pinched_vertex_rejected() {
        // Two tetrahedra sharing only vertex 0
        let mut input = shapes::tetrahedron();
        let offset = input.vertices.len();
        input.vertices.extend([
            Point3f::new(-3.0, 1.0, -1.0),
            Point3f::new(-3.0, -1.0, 1.0),
            Point3f::new(-5.0, 1.0, 1.0),
        ]);
        let other = [
            vec![0, offset, offset + 1],
            vec![0, offset + 2, offset],
            vec![0, offset + 1, offset + 2],
            vec![offset, offset + 2, offset + 1],
        ];
        input.faces.extend(other);
        assert!(matches!(
            Mesh::from_polygons(&input),
            Err(Error::NonManifoldVertex { vertex: 0 })
        ));
    }

    #[test]
    fn test_unreferenced_vertex_dropped() {
        let mut input = shapes::tetrahedron();
        input.vertices.push(Point3f::new(10.0, 10.0, 10.0));
        let mesh = Mesh::from_polygons(&input).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.verify().is_ok());
        // The bounding box still covers every input position
        assert_eq!(mesh.bounds.max, Point3f::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn test_initial_metrics_cover_one_ring() {
        let mesh = Mesh::from_polygons(&shapes::octahedron()).unwrap();
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.metric(v).n, 4.0);
        }
    }
}
