//! Polygon mesh data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};

/// An indexed polygon mesh: the flat feed that half-edge construction consumes
/// and the shape simplified surfaces are exported back to.
///
/// Face indices are 0-based into `vertices`. Each face keeps the winding it
/// was given; construction requires neighbouring faces to agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<Vec<usize>>,
}

impl PolygonMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: Vec<usize>) {
        self.faces.push(face);
    }

    /// Whether every face is a triangle
    pub fn is_triangle_mesh(&self) -> bool {
        self.faces.iter().all(|f| f.len() == 3)
    }

    /// Fan-triangulate every polygon around its first corner.
    ///
    /// Faces with fewer than three corners are passed through untouched so
    /// that construction can still report them.
    pub fn triangulated(&self) -> Self {
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            if face.len() <= 3 {
                faces.push(face.clone());
                continue;
            }
            for i in 1..face.len() - 1 {
                faces.push(vec![face[0], face[i], face[i + 1]]);
            }
        }
        Self {
            vertices: self.vertices.clone(),
            faces,
        }
    }

    /// Reverse the winding of every face, for models stored inside out
    pub fn reversed(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            faces: self
                .faces
                .iter()
                .map(|f| f.iter().rev().copied().collect())
                .collect(),
        }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
    }
}

impl Default for PolygonMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> PolygonMesh {
        PolygonMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_triangulated_fan() {
        let mesh = quad().triangulated();
        assert_eq!(mesh.faces, vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_reversed_winding() {
        let mesh = quad().reversed();
        assert_eq!(mesh.faces, vec![vec![3, 2, 1, 0]]);
    }

    #[test]
    fn test_add_and_clear() {
        let mut mesh = PolygonMesh::new();
        assert!(mesh.is_empty());
        let a = mesh.add_vertex(Point3f::origin());
        let b = mesh.add_vertex(Point3f::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3f::new(0.0, 1.0, 0.0));
        mesh.add_face(vec![a, b, c]);
        assert_eq!(mesh.face_count(), 1);
        assert!(!mesh.is_empty());
        mesh.clear();
        assert!(mesh.is_empty());
    }
}
