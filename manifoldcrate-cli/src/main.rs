//! manifoldcrate - simplify a closed polygon mesh by edge collapse
//!
//! Loads an OBJ surface, collapses edges in order of quadric cost until the
//! requested face count is reached, prints a report and optionally writes
//! the result.

use anyhow::{bail, Context, Result};
use clap::Parser;
use manifoldcrate_core::{Drawable, PolygonMesh};
use manifoldcrate_io::{write_mesh, ObjReadOptions, ObjReader};
use manifoldcrate_simplification::{
    EdgeCollapseSimplifier, MeshSimplifier, SimplifyReport, SimplifyTarget,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "manifoldcrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OBJ file holding a closed, consistently oriented surface
    input: PathBuf,

    /// Number of faces to keep
    #[arg(short, long, conflicts_with = "reduction")]
    target: Option<usize>,

    /// Fraction of faces to remove, between 0 and 1
    #[arg(short, long, default_value_t = 0.5)]
    reduction: f32,

    /// Write the simplified mesh here (format chosen by extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reverse the winding of every face while loading
    #[arg(long)]
    invert: bool,

    /// Split polygons into triangles while loading
    #[arg(long)]
    triangulate: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Check mesh invariants after simplifying
    #[arg(long)]
    verify: bool,
}

impl Cli {
    fn simplify_target(&self) -> Result<SimplifyTarget> {
        match self.target {
            Some(faces) => Ok(SimplifyTarget::Faces(faces)),
            None if (0.0..=1.0).contains(&self.reduction) => {
                Ok(SimplifyTarget::Reduction(self.reduction))
            }
            None => bail!("--reduction must lie in [0, 1], got {}", self.reduction),
        }
    }

    fn read_options(&self) -> ObjReadOptions {
        ObjReadOptions::new()
            .with_invert(self.invert)
            .with_triangulate(self.triangulate)
    }
}

/// Everything printed by `--json`
#[derive(Serialize, Debug)]
struct RunSummary {
    input: PathBuf,
    output: Option<PathBuf>,
    bounding_box_size: [f32; 3],
    bounding_box_centroid: [f32; 3],
    load_ms: f64,
    simplify_ms: f64,
    #[serde(flatten)]
    report: SimplifyReport,
}

fn load(cli: &Cli) -> Result<PolygonMesh> {
    ObjReader::read_mesh_with(&cli.input, &cli.read_options())
        .with_context(|| format!("failed to load {}", cli.input.display()))
}

fn run(cli: &Cli) -> Result<()> {
    let target = cli.simplify_target()?;

    let started = Instant::now();
    let mesh = load(cli)?;
    let load_time = started.elapsed();

    let size = mesh.bounding_box_size();
    let centroid = mesh.bounding_box_centroid();
    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        size = ?[size.x, size.y, size.z],
        centroid = ?[centroid.x, centroid.y, centroid.z],
        elapsed_ms = load_time.as_secs_f64() * 1e3,
        "Loaded {}",
        cli.input.display()
    );

    let started = Instant::now();
    let simplified = EdgeCollapseSimplifier::with_verify(cli.verify)
        .simplify(&mesh, target)
        .with_context(|| format!("failed to simplify {}", cli.input.display()))?;
    let simplify_time = started.elapsed();
    info!(
        elapsed_ms = simplify_time.as_secs_f64() * 1e3,
        "Simplified {}",
        cli.input.display()
    );

    if let Some(path) = &cli.output {
        write_mesh(&simplified.mesh, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(faces = simplified.mesh.face_count(), "Wrote {}", path.display());
    }

    if cli.json {
        let summary = RunSummary {
            input: cli.input.clone(),
            output: cli.output.clone(),
            bounding_box_size: [size.x, size.y, size.z],
            bounding_box_centroid: [centroid.x, centroid.y, centroid.z],
            load_ms: load_time.as_secs_f64() * 1e3,
            simplify_ms: simplify_time.as_secs_f64() * 1e3,
            report: simplified.report,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", simplified.report);
        println!(
            "Load: {:.2?}, simplify: {:.2?}",
            load_time, simplify_time
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli)
}
