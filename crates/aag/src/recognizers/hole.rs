//! Internal cylinders with concave/concentric bounding circles: drilled and
//! counterbored holes.

use std::collections::{BTreeMap, HashSet};

use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::vector::Vec3;

use super::{coaxial, Feature, FeatureIdCounter, FeatureType, Recognizer};
use crate::graph::{Fid, Graph, SurfaceKind, SurfaceParams};

const AXIS_DISTANCE_TOL: f64 = 1e-3;
const ARC_ANGLE_TOL_DEG: f64 = 5.0;

#[derive(Default)]
pub struct HoleRecognizer;

fn cylinder_axis(graph: &Graph, fid: Fid) -> Option<(Point3d, Vec3, f64)> {
    match graph.attrs(fid).params {
        SurfaceParams::Cylinder { origin, axis, radius } => {
            Some((Point3d::from_array(origin), Vec3::from_array(axis).normalize(), radius))
        }
        _ => None,
    }
}

/// True if the face's outward normal points toward its own axis — it bounds
/// a bore, not a boss.
fn is_internal(graph: &Graph, fid: Fid, origin: Point3d, axis: Vec3) -> bool {
    let centroid = Point3d::from_array(graph.attrs(fid).centroid);
    let h = (centroid - origin).dot(&axis);
    let foot = origin + axis * h;
    let radial = centroid - foot;
    if radial.length() < 1e-9 {
        return false;
    }
    let radial_dir = radial.normalize();
    let normal = Vec3::from_array(graph.attrs(fid).normal);
    normal.dot(&radial_dir) < 0.0
}

fn point_to_line_distance(point: [f64; 3], origin: Point3d, axis: Vec3) -> f64 {
    let p = Point3d::from_array(point);
    let h = (p - origin).dot(&axis);
    let foot = origin + axis * h;
    p.distance_to(&foot)
}

/// Has at least one semicircular (~180°) bounding arc centered on the axis
/// and no quarter-circle (~90°) bounding arc — the signature that
/// distinguishes a hole wall from a fillet blend.
fn has_hole_arc_signature(graph: &Graph, fid: Fid, origin: Point3d, axis: Vec3) -> bool {
    let mut has_semicircle = false;
    for arc in &graph.attrs(fid).bounding_arcs {
        if point_to_line_distance(arc.center, origin, axis) > AXIS_DISTANCE_TOL {
            continue;
        }
        if (arc.span_deg - 90.0).abs() < ARC_ANGLE_TOL_DEG {
            return false;
        }
        if (arc.span_deg - 180.0).abs() < ARC_ANGLE_TOL_DEG {
            has_semicircle = true;
        }
    }
    has_semicircle
}

impl Recognizer for HoleRecognizer {
    fn name(&self) -> &'static str {
        "hole"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[FeatureType::Hole]
    }

    fn recognize(
        &self,
        graph: &Graph,
        excluded: &HashSet<Fid>,
        id_counter: &mut FeatureIdCounter,
    ) -> Vec<Feature> {
        let mut traversed: HashSet<Fid> = HashSet::new();
        let mut features = Vec::new();

        for seed in graph.cylindrical_faces() {
            if traversed.contains(&seed) || excluded.contains(&seed) {
                continue;
            }
            let Some((origin, axis, _radius)) = cylinder_axis(graph, seed) else { continue };
            if !is_internal(graph, seed, origin, axis) {
                continue;
            }
            if !has_hole_arc_signature(graph, seed, origin, axis) {
                continue;
            }

            let mut chain = Vec::new();
            let mut stack = vec![seed];
            let mut visited_this_chain = HashSet::new();
            while let Some(fid) = stack.pop() {
                if !visited_this_chain.insert(fid) {
                    continue;
                }
                chain.push(fid);
                traversed.insert(fid);
                for (nfid, _arc) in graph.neighbors(fid) {
                    if visited_this_chain.contains(&nfid) || excluded.contains(&nfid) {
                        continue;
                    }
                    if graph.attrs(nfid).kind != SurfaceKind::Cylinder {
                        continue;
                    }
                    let Some((n_origin, n_axis, _)) = cylinder_axis(graph, nfid) else { continue };
                    if !is_internal(graph, nfid, n_origin, n_axis) {
                        continue;
                    }
                    let a = n_origin.to_array();
                    let b = origin.to_array();
                    if coaxial(a, n_axis.to_array(), b, axis.to_array()) {
                        stack.push(nfid);
                    }
                }
            }

            let radii: Vec<f64> = chain
                .iter()
                .filter_map(|&f| cylinder_axis(graph, f).map(|(_, _, r)| r))
                .collect();
            let min_radius = radii.iter().cloned().fold(f64::INFINITY, f64::min);

            let mut params = BTreeMap::new();
            params.insert("diameter_mm".to_string(), 2.0 * min_radius);
            params.insert("radius_mm".to_string(), min_radius);
            params.insert("axis_x".to_string(), axis.x);
            params.insert("axis_y".to_string(), axis.y);
            params.insert("axis_z".to_string(), axis.z);
            if chain.len() > 1 {
                params.insert("bore_count".to_string(), chain.len() as f64);
            }

            features.push(Feature {
                id: id_counter.next(FeatureType::Hole),
                feature_type: FeatureType::Hole,
                subtype: Some(if chain.len() > 1 { "counterbored" } else { "simple" }.to_string()),
                faces: chain,
                params,
                source: self.name().to_string(),
                confidence: 0.9,
            });
        }

        features
    }
}
