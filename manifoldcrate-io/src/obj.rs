//! OBJ format support
//!
//! Only geometry is kept: vertex positions and the polygons of every object
//! and group. Texture coordinates, normals and materials are discarded.

use crate::{MeshReader, MeshWriter};
use manifoldcrate_core::{Error, Point3f, PolygonMesh, Result};
use obj::ObjData;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Options applied while loading an OBJ file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjReadOptions {
    /// Reverse the winding of every face
    pub invert: bool,
    /// Fan-triangulate polygons with more than three corners
    pub triangulate: bool,
}

impl ObjReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn with_triangulate(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }
}

pub struct ObjReader;
pub struct ObjWriter;

impl ObjReader {
    /// Read an OBJ file with the given options
    pub fn read_mesh_with<P: AsRef<Path>>(path: P, options: &ObjReadOptions) -> Result<PolygonMesh> {
        let file = File::open(path.as_ref())?;
        Self::read_mesh_from(BufReader::new(file), options)
    }

    /// Read OBJ data from any byte source
    pub fn read_mesh_from<R: Read>(reader: R, options: &ObjReadOptions) -> Result<PolygonMesh> {
        let data = ObjData::load_buf(reader)
            .map_err(|e| Error::InvalidData(format!("malformed OBJ data: {e}")))?;
        let mut mesh = obj_data_to_mesh(&data)?;

        if options.invert {
            mesh = mesh.reversed();
        }
        if options.triangulate {
            mesh = mesh.triangulated();
        }

        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Loaded OBJ mesh"
        );
        Ok(mesh)
    }
}

/// Collect positions and polygons, checking every index against the
/// position count.
fn obj_data_to_mesh(data: &ObjData) -> Result<PolygonMesh> {
    let vertices = data
        .position
        .iter()
        .map(|&[x, y, z]| Point3f::new(x, y, z))
        .collect::<Vec<_>>();
    let vertex_count = vertices.len();

    let mut faces = Vec::new();
    let polygons = data
        .objects
        .iter()
        .flat_map(|object| &object.groups)
        .flat_map(|group| &group.polys);
    for polygon in polygons {
        let face = faces.len();
        let mut corners = Vec::with_capacity(polygon.0.len());
        for tuple in &polygon.0 {
            let index = tuple.0;
            if index >= vertex_count {
                return Err(Error::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
            corners.push(index);
        }
        faces.push(corners);
    }

    Ok(PolygonMesh::from_vertices_and_faces(vertices, faces))
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<PolygonMesh> {
        Self::read_mesh_with(path, &ObjReadOptions::default())
    }
}

impl ObjWriter {
    /// Write `v` and 1-based `f` lines to any byte sink
    pub fn write_mesh_to<W: Write>(mesh: &PolygonMesh, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);

        writeln!(writer, "# manifoldcrate OBJ export")?;
        writeln!(writer, "# Vertices: {}", mesh.vertex_count())?;
        writeln!(writer, "# Faces: {}", mesh.face_count())?;

        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }

        for face in &mesh.faces {
            write!(writer, "f")?;
            for &index in face {
                if index >= mesh.vertex_count() {
                    return Err(Error::InvalidData(format!(
                        "face references vertex {index} of {}",
                        mesh.vertex_count()
                    )));
                }
                write!(writer, " {}", index + 1)?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &PolygonMesh, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        Self::write_mesh_to(mesh, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifoldcrate_core::shapes;

    const QUAD_PYRAMID: &str = "\
# square pyramid
o pyramid
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
v 0.5 0.5 1.0
vn 0.0 0.0 -1.0
vt 0.0 0.0
g base
f 1//1 4//1 3//1 2//1
g sides
f 1/1 2/1 5/1
f 2 3 5
f -3 -2 -1
f 4 1 5
";

    fn read(text: &str, options: &ObjReadOptions) -> Result<PolygonMesh> {
        ObjReader::read_mesh_from(text.as_bytes(), options)
    }

    #[test]
    fn test_read_polygons_across_groups() {
        let mesh = read(QUAD_PYRAMID, &ObjReadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.face_count(), 5);
        assert_eq!(mesh.faces[0], vec![0, 3, 2, 1]);
        assert_eq!(mesh.faces[1], vec![0, 1, 4]);
        // Negative indices count back from the latest vertex
        assert_eq!(mesh.faces[3], vec![2, 3, 4]);
        assert_eq!(mesh.vertices[4], Point3f::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn test_invert_and_triangulate() {
        let options = ObjReadOptions::new().with_invert(true).with_triangulate(true);
        let mesh = read(QUAD_PYRAMID, &options).unwrap();
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.is_triangle_mesh());
        // The base quad becomes two triangles ahead of the first side
        assert_eq!(mesh.faces[0], vec![1, 2, 3]);
        assert_eq!(mesh.faces[2], vec![4, 1, 0]);
    }

    #[test]
    fn test_index_out_of_range() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 7\n";
        assert!(read(text, &ObjReadOptions::default()).is_err());
    }

    #[test]
    fn test_malformed_input() {
        let text = "v 0 zero 0\n";
        assert!(read(text, &ObjReadOptions::default()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ObjReader::read_mesh("does/not/exist.obj");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_writer_output() {
        let mesh = PolygonMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        let mut out = Vec::new();
        ObjWriter::write_mesh_to(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("v 0.5 1 0\n"));
        assert!(text.ends_with("f 1 2 3\n"));
    }

    #[test]
    fn test_writer_rejects_bad_index() {
        let mesh = PolygonMesh::from_vertices_and_faces(vec![Point3f::origin()], vec![vec![0, 1, 2]]);
        assert!(ObjWriter::write_mesh_to(&mesh, Vec::new()).is_err());
    }

    #[test]
    fn test_round_trip_through_text() {
        let mesh = shapes::unit_cube_quads();
        let mut out = Vec::new();
        ObjWriter::write_mesh_to(&mesh, &mut out).unwrap();
        let loaded = ObjReader::read_mesh_from(out.as_slice(), &ObjReadOptions::default()).unwrap();
        assert_eq!(loaded, mesh);
    }
}
