//! Small closed reference surfaces
//!
//! Every shape is consistently wound (each shared edge is traversed in
//! opposite directions by its two faces) so it can be fed straight into
//! half-edge construction.

use crate::{mesh::PolygonMesh, point::Point3f};
use std::f32::consts::TAU;

fn cube_corners() -> Vec<Point3f> {
    vec![
        Point3f::new(0.0, 0.0, 0.0), // 0
        Point3f::new(1.0, 0.0, 0.0), // 1
        Point3f::new(1.0, 1.0, 0.0), // 2
        Point3f::new(0.0, 1.0, 0.0), // 3
        Point3f::new(0.0, 0.0, 1.0), // 4
        Point3f::new(1.0, 0.0, 1.0), // 5
        Point3f::new(1.0, 1.0, 1.0), // 6
        Point3f::new(0.0, 1.0, 1.0), // 7
    ]
}

/// Unit cube built from six quads (8 vertices, 12 edges).
pub fn unit_cube_quads() -> PolygonMesh {
    PolygonMesh::from_vertices_and_faces(
        cube_corners(),
        vec![
            vec![0, 3, 2, 1], // bottom, -Z
            vec![4, 5, 6, 7], // top, +Z
            vec![0, 1, 5, 4], // front, -Y
            vec![3, 7, 6, 2], // back, +Y
            vec![0, 4, 7, 3], // left, -X
            vec![1, 2, 6, 5], // right, +X
        ],
    )
}

/// Unit cube with every side split into two triangles (12 faces, 18 edges).
pub fn unit_cube() -> PolygonMesh {
    PolygonMesh::from_vertices_and_faces(
        cube_corners(),
        vec![
            vec![0, 3, 2],
            vec![0, 2, 1],
            vec![4, 5, 6],
            vec![4, 6, 7],
            vec![0, 1, 5],
            vec![0, 5, 4],
            vec![3, 7, 6],
            vec![3, 6, 2],
            vec![0, 4, 7],
            vec![0, 7, 3],
            vec![1, 2, 6],
            vec![1, 6, 5],
        ],
    )
}

/// Regular tetrahedron inscribed in the cube `[-1, 1]^3`.
pub fn tetrahedron() -> PolygonMesh {
    PolygonMesh::from_vertices_and_faces(
        vec![
            Point3f::new(1.0, 1.0, 1.0),
            Point3f::new(1.0, -1.0, -1.0),
            Point3f::new(-1.0, 1.0, -1.0),
            Point3f::new(-1.0, -1.0, 1.0),
        ],
        vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]],
    )
}

/// Regular octahedron with unit circumradius.
pub fn octahedron() -> PolygonMesh {
    PolygonMesh::from_vertices_and_faces(
        vec![
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, -1.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(0.0, 0.0, -1.0),
        ],
        vec![
            vec![0, 2, 4],
            vec![2, 1, 4],
            vec![1, 3, 4],
            vec![3, 0, 4],
            vec![2, 0, 5],
            vec![1, 2, 5],
            vec![3, 1, 5],
            vec![0, 3, 5],
        ],
    )
}

/// Torus made of `rings * sides` quads. Both counts are raised to at least 3.
pub fn torus_quads(rings: usize, sides: usize, major_radius: f32, minor_radius: f32) -> PolygonMesh {
    let rings = rings.max(3);
    let sides = sides.max(3);

    let mut vertices = Vec::with_capacity(rings * sides);
    for i in 0..rings {
        let theta = TAU * i as f32 / rings as f32;
        for j in 0..sides {
            let phi = TAU * j as f32 / sides as f32;
            let r = major_radius + minor_radius * phi.cos();
            vertices.push(Point3f::new(
                r * theta.cos(),
                r * theta.sin(),
                minor_radius * phi.sin(),
            ));
        }
    }

    let index = |i: usize, j: usize| (i % rings) * sides + (j % sides);
    let mut faces = Vec::with_capacity(rings * sides);
    for i in 0..rings {
        for j in 0..sides {
            faces.push(vec![
                index(i, j),
                index(i + 1, j),
                index(i + 1, j + 1),
                index(i, j + 1),
            ]);
        }
    }

    PolygonMesh::from_vertices_and_faces(vertices, faces)
}

/// Triangulated torus: `2 * rings * sides` faces, every vertex of valence 6.
pub fn torus(rings: usize, sides: usize, major_radius: f32, minor_radius: f32) -> PolygonMesh {
    torus_quads(rings, sides, major_radius, minor_radius).triangulated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Each directed edge appears once and its reverse appears once.
    fn assert_closed_and_oriented(mesh: &PolygonMesh) {
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &mesh.faces {
            for i in 0..face.len() {
                let key = (face[i], face[(i + 1) % face.len()]);
                *directed.entry(key).or_default() += 1;
            }
        }
        for (&(a, b), &count) in &directed {
            assert_eq!(count, 1, "directed edge ({a}, {b}) repeated");
            assert_eq!(directed.get(&(b, a)), Some(&1), "edge ({a}, {b}) unpaired");
        }
    }

    #[test]
    fn test_reference_shapes_are_closed() {
        assert_closed_and_oriented(&unit_cube_quads());
        assert_closed_and_oriented(&unit_cube());
        assert_closed_and_oriented(&tetrahedron());
        assert_closed_and_oriented(&octahedron());
        assert_closed_and_oriented(&torus_quads(6, 4, 2.0, 0.5));
        assert_closed_and_oriented(&torus(5, 7, 2.0, 0.5));
    }

    #[test]
    fn test_torus_counts() {
        let t = torus(8, 6, 3.0, 1.0);
        assert_eq!(t.vertex_count(), 48);
        assert_eq!(t.face_count(), 96);
        assert!(t.is_triangle_mesh());
    }
}
