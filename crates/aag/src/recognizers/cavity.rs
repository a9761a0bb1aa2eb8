//! Seeded concave propagation bounded by convex arcs: pockets and cavities.

use std::collections::{BTreeMap, HashSet, VecDeque};

use super::{Feature, FeatureIdCounter, FeatureType, Recognizer};
use crate::graph::{Convexity, Fid, Graph};

const SEED_CONCAVE_RATIO: f64 = 0.6;
const MIN_CONCAVE_NEIGHBORS: usize = 2;
/// Seed-concave gate (spec: `theta > +epsilon`, `epsilon = 5deg`, and not smooth).
const SEED_CONCAVE_MIN_DEG: f64 = 5.0;
const SEED_CONCAVE_MAX_DEG: f64 = 177.0;
const MIN_CAVITY_SIZE: usize = 3;
const MAX_FACE_FRACTION: f64 = 0.25;
const LARGE_CAVITY_THRESHOLD: usize = 15;
const BOUNDARY_RATIO_LARGE: f64 = 0.25;
const BOUNDARY_RATIO_DEFAULT: f64 = 0.20;
/// No stated default in the source spec; chosen generously so volume only
/// rejects implausibly large "cavities" that are really the whole part.
const MAX_VOLUME_MM3: f64 = 1.0e7;

#[derive(Default)]
pub struct CavityRecognizer;

fn is_seed(graph: &Graph, fid: Fid) -> bool {
    let neighbors: Vec<_> = graph.neighbors(fid).collect();
    if neighbors.is_empty() {
        return false;
    }
    let concave = neighbors
        .iter()
        .filter(|(_, arc)| arc.angle_deg > SEED_CONCAVE_MIN_DEG && arc.angle_deg.abs() < SEED_CONCAVE_MAX_DEG)
        .count();
    concave >= MIN_CONCAVE_NEIGHBORS && (concave as f64) / (neighbors.len() as f64) >= SEED_CONCAVE_RATIO
}

fn propagate(graph: &Graph, seed: Fid, claimed: &HashSet<Fid>) -> HashSet<Fid> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(seed);
    visited.insert(seed);
    while let Some(fid) = queue.pop_front() {
        for (nfid, arc) in graph.neighbors(fid) {
            if visited.contains(&nfid) || claimed.contains(&nfid) {
                continue;
            }
            if arc.convexity == Convexity::Convex {
                continue;
            }
            visited.insert(nfid);
            queue.push_back(nfid);
        }
    }
    visited
}

fn boundary_ratio(graph: &Graph, candidate: &HashSet<Fid>) -> f64 {
    let with_convex_exit = candidate
        .iter()
        .filter(|&&fid| {
            graph
                .neighbors(fid)
                .any(|(nfid, arc)| !candidate.contains(&nfid) && arc.convexity == Convexity::Convex)
        })
        .count();
    with_convex_exit as f64 / candidate.len() as f64
}

impl Recognizer for CavityRecognizer {
    fn name(&self) -> &'static str {
        "cavity"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[FeatureType::Cavity]
    }

    fn recognize(
        &self,
        graph: &Graph,
        excluded: &HashSet<Fid>,
        id_counter: &mut FeatureIdCounter,
    ) -> Vec<Feature> {
        let mut features = Vec::new();
        let mut claimed: HashSet<Fid> = excluded.clone();

        for fid in graph.planar_faces() {
            if claimed.contains(&fid) || !is_seed(graph, fid) {
                continue;
            }

            let candidate = propagate(graph, fid, &claimed);
            let size = candidate.len();
            if size < MIN_CAVITY_SIZE || (size as f64) / (graph.face_count() as f64) >= MAX_FACE_FRACTION {
                continue;
            }

            let ratio = boundary_ratio(graph, &candidate);
            let required_ratio =
                if size > LARGE_CAVITY_THRESHOLD { BOUNDARY_RATIO_LARGE } else { BOUNDARY_RATIO_DEFAULT };
            if ratio < required_ratio {
                continue;
            }

            let total_area: f64 = candidate.iter().map(|&f| graph.attrs(f).area_mm2).sum();
            let estimated_volume = total_area * total_area.sqrt() * 0.1;
            if estimated_volume > MAX_VOLUME_MM3 {
                continue;
            }

            claimed.extend(candidate.iter().copied());

            let mut faces: Vec<Fid> = candidate.into_iter().collect();
            faces.sort_unstable();

            let mut params = BTreeMap::new();
            params.insert("total_area_mm2".to_string(), total_area);
            params.insert("estimated_volume_mm3".to_string(), estimated_volume);
            params.insert("boundary_ratio".to_string(), ratio);

            features.push(Feature {
                id: id_counter.next(FeatureType::Cavity),
                feature_type: FeatureType::Cavity,
                subtype: Some("pocket".to_string()),
                faces,
                params,
                source: self.name().to_string(),
                confidence: 0.70,
            });
        }

        features
    }
}
