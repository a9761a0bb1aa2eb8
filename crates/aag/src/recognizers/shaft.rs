//! External cylinders (bosses): the hole recognizer's mirror image.

use std::collections::{BTreeMap, HashSet};

use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::vector::Vec3;

use super::{coaxial, Feature, FeatureIdCounter, FeatureType, Recognizer};
use crate::graph::{Fid, Graph, SurfaceKind, SurfaceParams};

#[derive(Default)]
pub struct ShaftRecognizer;

fn cylinder_axis(graph: &Graph, fid: Fid) -> Option<(Point3d, Vec3, f64)> {
    match graph.attrs(fid).params {
        SurfaceParams::Cylinder { origin, axis, radius } => {
            Some((Point3d::from_array(origin), Vec3::from_array(axis).normalize(), radius))
        }
        _ => None,
    }
}

/// True if the face's outward normal points away from its own axis — it
/// bounds a solid boss, not a bore.
fn is_external(graph: &Graph, fid: Fid, origin: Point3d, axis: Vec3) -> bool {
    let centroid = Point3d::from_array(graph.attrs(fid).centroid);
    let h = (centroid - origin).dot(&axis);
    let foot = origin + axis * h;
    let radial = centroid - foot;
    if radial.length() < 1e-9 {
        return false;
    }
    let radial_dir = radial.normalize();
    let normal = Vec3::from_array(graph.attrs(fid).normal);
    normal.dot(&radial_dir) > 0.0
}

impl Recognizer for ShaftRecognizer {
    fn name(&self) -> &'static str {
        "shaft"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[FeatureType::Shaft]
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
            if !is_external(graph, seed, origin, axis) {
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
                    if !is_external(graph, nfid, n_origin, n_axis) {
                        continue;
                    }
                    if coaxial(n_origin.to_array(), n_axis.to_array(), origin.to_array(), axis.to_array()) {
                        stack.push(nfid);
                    }
                }
            }

            let radii: Vec<f64> = chain
                .iter()
                .filter_map(|&f| cylinder_axis(graph, f).map(|(_, _, r)| r))
                .collect();
            let min_radius = radii.iter().cloned().fold(f64::INFINITY, f64::min);
            let distinct_radii = {
                let mut rs = radii.clone();
                rs.sort_by(|a, b| a.partial_cmp(b).unwrap());
                rs.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
                rs.len()
            };

            let mut params = BTreeMap::new();
            params.insert("diameter_mm".to_string(), 2.0 * min_radius);
            params.insert("radius_mm".to_string(), min_radius);
            params.insert("axis_x".to_string(), axis.x);
            params.insert("axis_y".to_string(), axis.y);
            params.insert("axis_z".to_string(), axis.z);
            params.insert("segment_count".to_string(), chain.len() as f64);

            features.push(Feature {
                id: id_counter.next(FeatureType::Shaft),
                feature_type: FeatureType::Shaft,
                subtype: Some(if distinct_radii > 1 { "stepped" } else { "simple" }.to_string()),
                faces: chain,
                params,
                source: self.name().to_string(),
                confidence: 0.9,
            });
        }

        features
    }
}
