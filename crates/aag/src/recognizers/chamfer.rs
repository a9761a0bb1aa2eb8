//! Small oblique planar faces bounded by sharp edges: chamfers.

use std::collections::{BTreeMap, HashSet};

use super::{Feature, FeatureIdCounter, FeatureType, Recognizer};
use crate::graph::{Fid, Graph, SurfaceParams};

const MAX_WIDTH_MM: f64 = 5.0;
const SHARP_ANGLE_TOL_DEG: f64 = 20.0;

#[derive(Default)]
pub struct ChamferRecognizer;

fn is_oblique_normal(normal: [f64; 3]) -> bool {
    normal.iter().all(|c| { let a = c.abs(); a > 0.1 && a < 0.94 })
}

fn sharp_neighbor_count(graph: &Graph, fid: Fid) -> usize {
    graph
        .neighbors(fid)
        .filter(|(_, arc)| (arc.angle_deg - 180.0).abs() > SHARP_ANGLE_TOL_DEG)
        .count()
}

impl Recognizer for ChamferRecognizer {
    fn name(&self) -> &'static str {
        "chamfer"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[FeatureType::Chamfer]
    }

    fn recognize(
        &self,
        graph: &Graph,
        excluded: &HashSet<Fid>,
        id_counter: &mut FeatureIdCounter,
    ) -> Vec<Feature> {
        let mut features = Vec::new();
        let max_area = 10.0 * MAX_WIDTH_MM * MAX_WIDTH_MM;

        for fid in graph.planar_faces() {
            if excluded.contains(&fid) {
                continue;
            }
            let attrs = graph.attrs(fid);
            if !matches!(attrs.params, SurfaceParams::Plane { .. }) {
                continue;
            }
            if !is_oblique_normal(attrs.normal) {
                continue;
            }
            if attrs.area_mm2 > max_area {
                continue;
            }
            if attrs.linear_edge_count < 2 {
                continue;
            }
            if sharp_neighbor_count(graph, fid) < 2 {
                continue;
            }

            let mut params = BTreeMap::new();
            params.insert("width_mm".to_string(), attrs.bbox_min_extent_mm);
            params.insert("area_mm2".to_string(), attrs.area_mm2);

            features.push(Feature {
                id: id_counter.next(FeatureType::Chamfer),
                feature_type: FeatureType::Chamfer,
                subtype: None,
                faces: vec![fid],
                params,
                source: self.name().to_string(),
                confidence: 0.80,
            });
        }

        features
    }
}
