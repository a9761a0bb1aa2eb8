//! Builds an immutable `Graph` from a `GeometryAdapter` in a single pass.

use cad_kernel::geometry::vector::Vec3;

use crate::adapter::{DihedralSample, GeometryAdapter};
use crate::error::{AagError, Result};
use crate::graph::{Arc, Convexity, FaceAttributes, Fid, Graph};

/// A built graph plus any non-fatal diagnostics collected while building it.
pub struct BuildOutput {
    pub graph: Graph,
    pub diagnostics: Vec<AagError>,
}

/// Build the attributed adjacency graph for one shape.
///
/// Faces are indexed in the adapter's deterministic order; for every
/// interior edge the signed dihedral angle is computed per the projected-
/// tangent-plane algorithm. A degenerate edge (zero-length tangent or
/// normal) is recorded as a diagnostic and omitted from the arc list rather
/// than failing the whole build.
pub fn build(adapter: &dyn GeometryAdapter) -> Result<BuildOutput> {
    let face_count = adapter.face_count();
    if face_count == 0 {
        return Err(AagError::InvalidShape { reason: "shape has no faces".to_string() });
    }

    let mut faces = Vec::with_capacity(face_count);
    for fid in 0..face_count as Fid {
        faces.push(FaceAttributes {
            fid,
            kind: adapter.surface_kind(fid),
            params: adapter.surface_params(fid),
            area_mm2: adapter.face_area(fid),
            normal: adapter.face_normal_at_centroid(fid),
            centroid: adapter.face_centroid(fid),
            bounding_arcs: adapter.bounding_arcs(fid),
            linear_edge_count: adapter.linear_edge_count(fid),
            bbox_max_extent_mm: adapter.bbox_max_extent(fid),
            bbox_min_extent_mm: adapter.bbox_min_extent(fid),
        });
    }

    let mut arcs = Vec::new();
    let mut diagnostics = Vec::new();
    for (eid, a, b) in adapter.interior_edges() {
        let sample = adapter.dihedral_sample(eid);
        let angle = sample.and_then(signed_dihedral_deg);
        match angle {
            Some(angle_deg) => arcs.push(Arc {
                eid,
                faces: (a, b),
                angle_deg,
                convexity: Convexity::classify(angle_deg),
            }),
            None => diagnostics.push(AagError::DegenerateEdge { eid }),
        }
    }

    Ok(BuildOutput { graph: Graph::new(faces, arcs), diagnostics })
}

/// Signed dihedral angle in degrees, `(-180, 180]`, positive ⇒ concave.
///
/// `y_i = n_i × t` projects each face's normal into the plane perpendicular
/// to the shared tangent; the signed angle between `y_a` and `y_b` measured
/// about `t` is the dihedral angle.
pub fn signed_dihedral_deg(sample: DihedralSample) -> Option<f64> {
    let t = Vec3::from_array(sample.tangent).normalized()?;
    let n_a = Vec3::from_array(sample.normal_a);
    let n_b = Vec3::from_array(sample.normal_b);
    let y_a = n_a.cross(&t).normalized()?;
    let y_b = n_b.cross(&t).normalized()?;
    let cos_theta = y_a.dot(&y_b);
    let sin_theta = y_a.cross(&y_b).dot(&t);
    Some(sin_theta.atan2(cos_theta).to_degrees())
}
