//! The attributed adjacency graph: faces as nodes, shared edges as arcs
//! carrying a signed dihedral angle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stable integer face index, assigned by a single deterministic traversal
/// at load time. Every consumer of a given shape agrees on the same FIDs.
pub type Fid = u32;

/// Stable integer edge index, assigned alongside arc construction.
pub type Eid = u32;

/// Closed enumeration of surface kinds a face can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Plane,
    Cylinder,
    Cone,
    Sphere,
    Torus,
    BSpline,
    Other,
}

/// Canonical parameters for a face's surface, keyed by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceParams {
    Plane { point: [f64; 3], normal: [f64; 3] },
    Cylinder { origin: [f64; 3], axis: [f64; 3], radius: f64 },
    Cone { apex: [f64; 3], axis: [f64; 3], half_angle: f64 },
    Sphere { center: [f64; 3], radius: f64 },
    Torus { center: [f64; 3], axis: [f64; 3], major_radius: f64, minor_radius: f64 },
    Other,
}

/// A circular bounding edge of a face: its center, the axis it sweeps
/// around, and the angular range (degrees) its parameter interval covers.
/// Lets recognizers distinguish semicircular (hole), quarter-circle
/// (fillet), and full-circle boundary edges without re-querying the kernel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingArc {
    pub center: [f64; 3],
    pub axis: [f64; 3],
    pub span_deg: f64,
}

/// Cached, per-face geometric attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceAttributes {
    pub fid: Fid,
    pub kind: SurfaceKind,
    pub params: SurfaceParams,
    pub area_mm2: f64,
    pub normal: [f64; 3],
    pub centroid: [f64; 3],
    pub bounding_arcs: Vec<BoundingArc>,
    /// Count of straight bounding edges (as opposed to circular/other).
    pub linear_edge_count: usize,
    /// Largest axis-aligned extent of the face's boundary loop, in mm;
    /// stands in for a true bounding-box diagonal when sizing chamfers and
    /// thin-wall pairs.
    pub bbox_max_extent_mm: f64,
    /// Smallest non-degenerate axis-aligned extent of the face's boundary
    /// loop, in mm — the chamfer/thin-wall "narrow" dimension, as opposed
    /// to `bbox_max_extent_mm`'s "long" dimension.
    pub bbox_min_extent_mm: f64,
}

/// A shared edge's classification, derived from the signed dihedral angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convexity {
    Smooth,
    Convex,
    Concave,
}

impl Convexity {
    /// Classify a signed dihedral angle in degrees, `(-180, 180]`.
    ///
    /// Positive angles are concave; this sign convention matches the
    /// reference engine this recognizer family was distilled from and must
    /// not be flipped.
    pub fn classify(angle_deg: f64) -> Self {
        if angle_deg.abs() > 177.0 {
            Convexity::Smooth
        } else if angle_deg < 0.0 {
            Convexity::Convex
        } else {
            Convexity::Concave
        }
    }
}

/// One shared edge between exactly two faces, with its signed dihedral angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    pub eid: Eid,
    pub faces: (Fid, Fid),
    pub angle_deg: f64,
    pub convexity: Convexity,
}

/// The built graph: immutable once constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Indexed by Fid.
    pub faces: Vec<FaceAttributes>,
    pub arcs: Vec<Arc>,
    #[serde(skip)]
    pair_index: HashMap<(Fid, Fid), usize>,
    #[serde(skip)]
    neighbors: Vec<Vec<(Fid, usize)>>,
}

fn pair_key(a: Fid, b: Fid) -> (Fid, Fid) {
    if a <= b { (a, b) } else { (b, a) }
}

impl Graph {
    /// Build a graph from precomputed faces and arcs, indexing the
    /// symmetric neighbor/pair lookup. Exposed publicly so callers can
    /// construct synthetic graphs directly (as the test fixtures below do)
    /// without going through a `GeometryAdapter`.
    pub fn new(faces: Vec<FaceAttributes>, arcs: Vec<Arc>) -> Self {
        let mut pair_index = HashMap::with_capacity(arcs.len());
        let mut neighbors = vec![Vec::new(); faces.len()];
        for (i, arc) in arcs.iter().enumerate() {
            let (a, b) = arc.faces;
            pair_index.insert(pair_key(a, b), i);
            neighbors[a as usize].push((b, i));
            neighbors[b as usize].push((a, i));
        }
        Self { faces, arcs, pair_index, neighbors }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn attrs(&self, fid: Fid) -> &FaceAttributes {
        &self.faces[fid as usize]
    }

    pub fn neighbors(&self, fid: Fid) -> impl Iterator<Item = (Fid, &Arc)> {
        self.neighbors[fid as usize]
            .iter()
            .map(move |&(nfid, arc_idx)| (nfid, &self.arcs[arc_idx]))
    }

    pub fn arc(&self, a: Fid, b: Fid) -> Option<&Arc> {
        self.pair_index.get(&pair_key(a, b)).map(|&idx| &self.arcs[idx])
    }

    /// The dihedral angle in degrees between two adjacent faces, or 0 if
    /// they share no arc (not actually adjacent).
    pub fn dihedral(&self, a: Fid, b: Fid) -> f64 {
        self.arc(a, b).map(|arc| arc.angle_deg).unwrap_or(0.0)
    }

    pub fn faces_of_kind(&self, kind: SurfaceKind) -> impl Iterator<Item = Fid> + '_ {
        self.faces.iter().filter(move |f| f.kind == kind).map(|f| f.fid)
    }

    pub fn cylindrical_faces(&self) -> Vec<Fid> {
        self.faces_of_kind(SurfaceKind::Cylinder).collect()
    }

    pub fn toroidal_faces(&self) -> Vec<Fid> {
        self.faces_of_kind(SurfaceKind::Torus).collect()
    }

    pub fn planar_faces(&self) -> Vec<Fid> {
        self.faces_of_kind(SurfaceKind::Plane).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane_attrs(fid: Fid) -> FaceAttributes {
        FaceAttributes {
            fid,
            kind: SurfaceKind::Plane,
            params: SurfaceParams::Plane { point: [0.0; 3], normal: [0.0, 0.0, 1.0] },
            area_mm2: 1.0,
            normal: [0.0, 0.0, 1.0],
            centroid: [0.0; 3],
            bounding_arcs: vec![],
            linear_edge_count: 4,
            bbox_max_extent_mm: 1.0,
            bbox_min_extent_mm: 1.0,
        }
    }

    #[test]
    fn test_convexity_classification() {
        assert_eq!(Convexity::classify(178.0), Convexity::Smooth);
        assert_eq!(Convexity::classify(-178.0), Convexity::Smooth);
        assert_eq!(Convexity::classify(-10.0), Convexity::Convex);
        assert_eq!(Convexity::classify(10.0), Convexity::Concave);
        assert_eq!(Convexity::classify(180.0), Convexity::Smooth);
    }

    #[test]
    fn test_arc_lookup_is_symmetric() {
        let faces = vec![plane_attrs(0), plane_attrs(1)];
        let arcs = vec![Arc { eid: 0, faces: (0, 1), angle_deg: -45.0, convexity: Convexity::Convex }];
        let graph = Graph::new(faces, arcs);
        assert_eq!(graph.dihedral(0, 1), graph.dihedral(1, 0));
        assert!(graph.arc(0, 1).is_some());
        assert!(graph.arc(1, 0).is_some());
        assert_eq!(graph.neighbors(0).count(), 1);
        assert_eq!(graph.neighbors(1).count(), 1);
    }

    #[test]
    fn test_unconnected_faces_have_zero_dihedral() {
        let faces = vec![plane_attrs(0), plane_attrs(1)];
        let graph = Graph::new(faces, vec![]);
        assert_eq!(graph.dihedral(0, 1), 0.0);
        assert!(graph.arc(0, 1).is_none());
    }
}
