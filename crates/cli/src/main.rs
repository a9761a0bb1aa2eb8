//! Command-line orchestrator: load a shape, build its attributed adjacency
//! graph, run feature recognition, and write the result artifacts.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use aag::recognizers::RecognitionConfig;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::topology::brep::{EntityStore, SolidId};
use cad_kernel::topology::primitives::{make_box, make_cylinder, make_sphere};

/// Recognize manufacturing features in a B-rep shape via its attributed
/// adjacency graph.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input shape description (JSON; see `SceneShape`)
    #[arg(long)]
    input: PathBuf,
    /// Directory to write `features.json`, `aag.json`, `mesh.obj` and
    /// `mesh.tri_face_ids.bin` into
    #[arg(long)]
    outdir: PathBuf,
    /// Comma-separated recognizer selector, or "all"
    #[arg(long, default_value = "all")]
    modules: String,
    /// Tessellation linear deflection
    #[arg(long, default_value_t = 0.35)]
    mesh_quality: f64,
    /// Maximum wall thickness (mm) considered for the thin-wall recognizer
    #[arg(long, default_value_t = 5.0)]
    thin_wall_threshold: f64,
    /// Raise the log level; repeat for more detail (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

/// The CLI's native shape description. File import (STEP/IGES) is
/// explicitly out of scope for this engine; a scene is always one of the
/// kernel's parametric primitives.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SceneShape {
    Box { min: [f64; 3], max: [f64; 3] },
    Cylinder { center: [f64; 3], radius: f64, height: f64, #[serde(default = "default_segments")] segments: usize },
    Sphere { center: [f64; 3], radius: f64, #[serde(default = "default_meridians")] meridians: usize, #[serde(default = "default_parallels")] parallels: usize },
}

fn default_segments() -> usize {
    32
}

fn default_meridians() -> usize {
    24
}

fn default_parallels() -> usize {
    12
}

fn build_scene(store: &mut EntityStore, shape: SceneShape) -> SolidId {
    match shape {
        SceneShape::Box { min, max } => {
            make_box(store, min[0], min[1], min[2], max[0], max[1], max[2])
        }
        SceneShape::Cylinder { center, radius, height, segments } => {
            make_cylinder(store, Point3d::from_array(center), radius, height, segments)
        }
        SceneShape::Sphere { center, radius, meridians, parallels } => {
            make_sphere(store, Point3d::from_array(center), radius, meridians, parallels)
        }
    }
}

fn init_logging(verbose: u8, format: LogFormat) {
    let default_level = match verbose {
        0 => "aag=info,aag_cli=info",
        1 => "aag=debug,aag_cli=debug",
        _ => "aag=trace,aag_cli=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

fn selected_modules(modules: &str) -> Option<Vec<String>> {
    if modules.trim() == "all" {
        return None;
    }
    Some(modules.split(',').map(|s| s.trim().to_string()).collect())
}

fn module_tag(feature: &aag::Feature) -> &'static str {
    match feature.feature_type {
        aag::FeatureType::Hole => "recognize_holes",
        aag::FeatureType::Shaft => "recognize_shafts",
        aag::FeatureType::Fillet => "recognize_fillets",
        aag::FeatureType::Chamfer => "recognize_chamfers",
        aag::FeatureType::Cavity => "recognize_cavities",
        aag::FeatureType::ThinWall => "recognize_thin_walls",
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_format);
    run(args)
}

fn run(args: Args) -> Result<()> {
    let input_json = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input: {}", args.input.display()))?;
    let shape: SceneShape = serde_json::from_str(&input_json)
        .with_context(|| format!("failed to parse scene shape: {}", args.input.display()))?;

    let mut store = EntityStore::new();
    let solid_id = build_scene(&mut store, shape);

    let adapter = aag::KernelAdapter::new(&store, solid_id);
    let build_output = aag::build(&adapter).context("failed to build attributed adjacency graph")?;
    for diagnostic in &build_output.diagnostics {
        tracing::warn!(%diagnostic, "graph build diagnostic");
    }

    let config = RecognitionConfig { thin_wall_max_thickness_mm: args.thin_wall_threshold };
    let (all_features, _excluded) = aag::recognize_all(&build_output.graph, Some(&adapter), &config);

    let wanted = selected_modules(&args.modules);
    let features: Vec<_> = match &wanted {
        None => all_features,
        Some(tags) => all_features.into_iter().filter(|f| tags.iter().any(|t| t == module_tag(f))).collect(),
    };
    tracing::info!(count = features.len(), "recognition complete");

    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("failed to create output directory: {}", args.outdir.display()))?;

    let features_json = aag::export::features_to_json(&features).context("failed to serialize features")?;
    fs::write(args.outdir.join("features.json"), features_json).context("failed to write features.json")?;

    let aag_json = aag::export::graph_to_json(&build_output.graph).context("failed to serialize aag graph")?;
    fs::write(args.outdir.join("aag.json"), aag_json).context("failed to write aag.json")?;

    let mesh = cad_tessellation::tessellate_solid(&store, solid_id, args.mesh_quality);
    fs::write(args.outdir.join("mesh.obj"), cad_tessellation::mesh_to_obj(&mesh))
        .context("failed to write mesh.obj")?;
    fs::write(args.outdir.join("mesh.tri_face_ids.bin"), aag::export::triangle_face_map(&mesh))
        .context("failed to write mesh.tri_face_ids.bin")?;

    Ok(())
}
