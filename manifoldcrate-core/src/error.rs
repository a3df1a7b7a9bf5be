//! Error types for manifoldcrate

use thiserror::Error;

/// Main error type for manifoldcrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("Face {face} is degenerate: {reason}")]
    DegenerateFace { face: usize, reason: String },

    #[error("Edge ({a}, {b}) is shared by more than two faces")]
    NonManifoldEdge { a: usize, b: usize },

    #[error("Edge ({a}, {b}) is traversed in the same direction by two faces")]
    InconsistentOrientation { a: usize, b: usize },

    #[error("Edge ({a}, {b}) borders only one face; the surface is not closed")]
    OpenBoundary { a: usize, b: usize },

    #[error("Vertex {vertex} joins more than one fan of faces")]
    NonManifoldVertex { vertex: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for manifoldcrate operations
pub type Result<T> = std::result::Result<T, Error>;
