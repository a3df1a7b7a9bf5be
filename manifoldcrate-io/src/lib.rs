//! I/O operations for polygon meshes
//!
//! This crate reads the vertex and polygon lists that half-edge construction
//! consumes, and writes simplified surfaces back out. Wavefront OBJ is the
//! supported format.

pub mod obj;

pub use obj::{ObjReadOptions, ObjReader, ObjWriter};

use manifoldcrate_core::{Error, PolygonMesh, Result};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<PolygonMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &PolygonMesh, path: P) -> Result<()>;
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<PolygonMesh> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => ObjReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &PolygonMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => ObjWriter::write_mesh(mesh, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use manifoldcrate_core::shapes;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("manifoldcrate_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_obj_mesh_roundtrip() {
        let temp_file = temp_path("roundtrip.obj");
        let mesh = shapes::torus_quads(6, 4, 2.0, 0.5);

        ObjWriter::write_mesh(&mesh, &temp_file).unwrap();
        let loaded = ObjReader::read_mesh(&temp_file).unwrap();

        assert_eq!(loaded.vertex_count(), mesh.vertex_count());
        assert_eq!(loaded.faces, mesh.faces);
        for (original, read) in mesh.vertices.iter().zip(&loaded.vertices) {
            assert_relative_eq!(original.coords, read.coords, epsilon = 1e-6);
        }

        let _ = fs::remove_file(&temp_file);
    }

    #[test]
    fn test_auto_detect_functions() {
        let temp_file = temp_path("auto.OBJ");
        let mesh = shapes::tetrahedron();

        write_mesh(&mesh, &temp_file).unwrap();
        let loaded = read_mesh(&temp_file).unwrap();
        assert_eq!(loaded, mesh);

        let _ = fs::remove_file(&temp_file);
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            read_mesh("model.stl"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            write_mesh(&shapes::tetrahedron(), "model"),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
