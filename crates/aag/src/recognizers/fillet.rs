//! Small blends: cylindrical or toroidal faces with a quarter-circle
//! bounding arc.

use std::collections::{BTreeMap, HashSet};

use super::{Feature, FeatureIdCounter, FeatureType, Recognizer};
use crate::graph::{Fid, Graph, SurfaceKind, SurfaceParams};

const MAX_RADIUS_MM: f64 = 10.0;
const QUARTER_ARC_DEG: f64 = 90.0;
const ARC_ANGLE_TOL_DEG: f64 = 5.0;

#[derive(Default)]
pub struct FilletRecognizer;

fn has_quarter_arc(graph: &Graph, fid: Fid) -> bool {
    graph
        .attrs(fid)
        .bounding_arcs
        .iter()
        .any(|arc| (arc.span_deg - QUARTER_ARC_DEG).abs() < ARC_ANGLE_TOL_DEG)
}

impl Recognizer for FilletRecognizer {
    fn name(&self) -> &'static str {
        "fillet"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[FeatureType::Fillet]
    }

    fn recognize(
        &self,
        graph: &Graph,
        excluded: &HashSet<Fid>,
        id_counter: &mut FeatureIdCounter,
    ) -> Vec<Feature> {
        let mut features = Vec::new();

        for fid in 0..graph.face_count() as Fid {
            if excluded.contains(&fid) {
                continue;
            }
            let attrs = graph.attrs(fid);
            let (subtype, radius, major_radius) = match attrs.params {
                SurfaceParams::Cylinder { radius, .. } if radius <= MAX_RADIUS_MM => {
                    ("blend", radius, None)
                }
                SurfaceParams::Torus { minor_radius, major_radius, .. } if minor_radius <= MAX_RADIUS_MM => {
                    ("curved_blend", minor_radius, Some(major_radius))
                }
                _ => continue,
            };
            debug_assert!(matches!(attrs.kind, SurfaceKind::Cylinder | SurfaceKind::Torus));

            if !has_quarter_arc(graph, fid) {
                continue;
            }

            let mut params = BTreeMap::new();
            params.insert("radius_mm".to_string(), radius);
            if let SurfaceParams::Cylinder { axis, .. } = attrs.params {
                params.insert("axis_x".to_string(), axis[0]);
                params.insert("axis_y".to_string(), axis[1]);
                params.insert("axis_z".to_string(), axis[2]);
            }
            if let Some(major) = major_radius {
                params.insert("major_radius_mm".to_string(), major);
            }

            features.push(Feature {
                id: id_counter.next(FeatureType::Fillet),
                feature_type: FeatureType::Fillet,
                subtype: Some(subtype.to_string()),
                faces: vec![fid],
                params,
                source: self.name().to_string(),
                confidence: 0.85,
            });
        }

        features
    }
}
