//! The recognizer framework: a shared `Feature` record, a `Recognizer`
//! trait, and the orchestrator that runs the fixed recognizer sequence.

pub mod cavity;
pub mod chamfer;
pub mod fillet;
pub mod hole;
pub mod shaft;
pub mod thin_wall;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::adapter::GeometryAdapter;
use crate::graph::{Fid, Graph};

/// One recognized manufacturing feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub subtype: Option<String>,
    pub faces: Vec<Fid>,
    pub params: BTreeMap<String, f64>,
    pub source: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Hole,
    Shaft,
    Fillet,
    Chamfer,
    Cavity,
    ThinWall,
}

impl FeatureType {
    fn tag(self) -> &'static str {
        match self {
            FeatureType::Hole => "hole",
            FeatureType::Shaft => "shaft",
            FeatureType::Fillet => "fillet",
            FeatureType::Chamfer => "chamfer",
            FeatureType::Cavity => "cavity",
            FeatureType::ThinWall => "thin_wall",
        }
    }
}

/// Per-run, per-type counter used to mint feature ids like `hole_0001`.
#[derive(Debug, Default)]
pub struct FeatureIdCounter {
    counts: BTreeMap<&'static str, u32>,
}

impl FeatureIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, feature_type: FeatureType) -> String {
        let tag = feature_type.tag();
        let count = self.counts.entry(tag).or_insert(0);
        *count += 1;
        format!("{tag}_{count:04}")
    }
}

/// Tunable knobs for the recognizer pass, set from CLI flags or caller
/// defaults; everything else (arc-angle tolerances, size caps) is a fixed
/// constant per recognizer, matching spec-level thresholds rather than
/// runtime configuration.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    pub thin_wall_max_thickness_mm: f64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self { thin_wall_max_thickness_mm: 5.0 }
    }
}

/// A recognizer traverses the graph and emits zero or more features.
///
/// Recognizers never mutate the graph. `excluded` lists faces a prior
/// recognizer has already claimed; a recognizer running later in the fixed
/// order must not emit features built from excluded faces.
pub trait Recognizer {
    fn name(&self) -> &'static str;
    fn feature_types(&self) -> &'static [FeatureType];
    fn recognize(
        &self,
        graph: &Graph,
        excluded: &HashSet<Fid>,
        id_counter: &mut FeatureIdCounter,
    ) -> Vec<Feature>;
}

/// Run the fixed recognizer sequence (fillet → chamfer → thin-wall → hole →
/// shaft → cavity), threading a growing exclusion set. Only the fillet
/// recognizer adds to `excluded`. A recognizer that panics internally is not
/// caught here — callers running across a process boundary should catch_unwind
/// if they need that isolation; within a single run we trust recognizers to
/// return `Vec::new()` on internal failure rather than panic.
///
/// `adapter`, when present, lets the thin-wall recognizer ray-sample
/// thickness directly (spec §4.9 Phase 2) instead of falling back to a
/// single analytic measurement per pair; every other recognizer ignores it.
pub fn recognize_all(
    graph: &Graph,
    adapter: Option<&dyn GeometryAdapter>,
    config: &RecognitionConfig,
) -> (Vec<Feature>, HashSet<Fid>) {
    let mut excluded = HashSet::new();
    let mut id_counter = FeatureIdCounter::new();
    let mut all_features = Vec::new();

    let fillet = fillet::FilletRecognizer::default();
    let fillet_features = fillet.recognize(graph, &excluded, &mut id_counter);
    for f in &fillet_features {
        excluded.extend(f.faces.iter().copied());
    }
    all_features.extend(fillet_features);

    let chamfer = chamfer::ChamferRecognizer::default();
    all_features.extend(chamfer.recognize(graph, &excluded, &mut id_counter));

    let thin_wall = thin_wall::ThinWallRecognizer::new(config.thin_wall_max_thickness_mm);
    let thin_wall_features = match adapter {
        Some(adapter) => thin_wall.recognize_with_adapter(graph, adapter, &excluded, &mut id_counter),
        None => thin_wall.recognize(graph, &excluded, &mut id_counter),
    };
    all_features.extend(thin_wall_features);

    let hole = hole::HoleRecognizer::default();
    all_features.extend(hole.recognize(graph, &excluded, &mut id_counter));

    let shaft = shaft::ShaftRecognizer::default();
    all_features.extend(shaft.recognize(graph, &excluded, &mut id_counter));

    let cavity = cavity::CavityRecognizer::default();
    all_features.extend(cavity.recognize(graph, &excluded, &mut id_counter));

    (all_features, excluded)
}

/// Axis coaxiality test (spec §4.4.1): directions within 1° of parallel and
/// infinite lines within `1e-6` perpendicular distance.
///
/// The two axes are already known to be near-parallel once the direction
/// check passes, so the perpendicular distance is just the component of the
/// origin-to-origin vector orthogonal to the shared direction — the general
/// skew-line solver (`line_line_closest`) degenerates for parallel lines.
pub(crate) fn coaxial(
    origin_a: [f64; 3],
    axis_a: [f64; 3],
    origin_b: [f64; 3],
    axis_b: [f64; 3],
) -> bool {
    use cad_kernel::geometry::point::Point3d;
    use cad_kernel::geometry::vector::Vec3;

    let dir_a = Vec3::from_array(axis_a).normalize();
    let dir_b = Vec3::from_array(axis_b).normalize();
    let cos_1deg = 1.0_f64.to_radians().cos();
    if dir_a.dot(&dir_b).abs() <= cos_1deg {
        return false;
    }

    let delta = Point3d::from_array(origin_b) - Point3d::from_array(origin_a);
    let along = dir_a * delta.dot(&dir_a);
    let perpendicular = delta - along;
    perpendicular.length() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_id_counter_increments_per_type() {
        let mut counter = FeatureIdCounter::new();
        assert_eq!(counter.next(FeatureType::Hole), "hole_0001");
        assert_eq!(counter.next(FeatureType::Hole), "hole_0002");
        assert_eq!(counter.next(FeatureType::Fillet), "fillet_0001");
    }

    #[test]
    fn test_coaxial_identical_axes() {
        assert!(coaxial([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 5.0], [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_coaxial_offset_axes_rejected() {
        assert!(!coaxial([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_coaxial_angled_axes_rejected() {
        assert!(!coaxial([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]));
    }
}
