//! Property-based tests for the AAG builder and recognizer invariants,
//! following the teacher's `proptest` usage in `cad-kernel`'s own test
//! suite.

use proptest::prelude::*;

use aag::builder::signed_dihedral_deg;
use aag::adapter::DihedralSample;
use aag::graph::{Arc, BoundingArc, Convexity, FaceAttributes, Graph, SurfaceKind, SurfaceParams};
use aag::recognizers::RecognitionConfig;
use aag::{recognize_all, Fid, FeatureType};

fn arb_unit_vector() -> impl Strategy<Value = [f64; 3]> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0).prop_filter_map("non-degenerate", |(x, y, z)| {
        let len = (x * x + y * y + z * z).sqrt();
        if len < 1e-6 {
            None
        } else {
            Some([x / len, y / len, z / len])
        }
    })
}

proptest! {
    /// Swapping which face is "first" when sampling a shared edge's
    /// dihedral angle negates the signed result: this is the mirror
    /// relationship the `y_i = n_i x t` construction guarantees
    /// algebraically, independent of the actual geometry sampled.
    #[test]
    fn swapping_face_order_negates_signed_dihedral(
        tangent in arb_unit_vector(),
        normal_a in arb_unit_vector(),
        normal_b in arb_unit_vector(),
    ) {
        let forward = DihedralSample { tangent, normal_a, normal_b };
        let reversed = DihedralSample { tangent, normal_a: normal_b, normal_b: normal_a };

        if let (Some(fwd), Some(rev)) = (signed_dihedral_deg(forward), signed_dihedral_deg(reversed)) {
            let sum = fwd + rev;
            // angles wrap at +/-180, so the sum is 0 modulo 360
            let wrapped = ((sum + 180.0).rem_euclid(360.0)) - 180.0;
            prop_assert!(wrapped.abs() < 1e-6 || (wrapped.abs() - 360.0).abs() < 1e-6,
                "fwd={fwd} rev={rev} sum={sum}");
        }
    }

    /// A coaxial internal-cylinder counterbore pair is recognized as a
    /// single counterbored hole no matter which direction the shared axis
    /// happens to point.
    #[test]
    fn coaxial_counterbore_detected_regardless_of_axis_direction(
        axis in arb_unit_vector(),
        bore_radius in 2.0f64..10.0,
        step_radius in 10.1f64..30.0,
    ) {
        let bore = bore_face(0, axis, bore_radius);
        let counterbore = bore_face(1, axis, step_radius);
        let arcs = vec![Arc { eid: 0, faces: (0, 1), angle_deg: 120.0, convexity: Convexity::Concave }];
        let graph = Graph::new(vec![bore, counterbore], arcs);
        let (features, _) = recognize_all(&graph, None, &RecognitionConfig::default());

        let holes: Vec<_> = features.iter().filter(|f| f.feature_type == FeatureType::Hole).collect();
        prop_assert_eq!(holes.len(), 1);
        prop_assert_eq!(holes[0].subtype.as_deref(), Some("counterbored"));
    }
}

fn orthogonal_unit(axis: [f64; 3]) -> [f64; 3] {
    let a = aag_vec(axis);
    let fallback = if a[0].abs() < 0.9 { [1.0, 0.0, 0.0] } else { [0.0, 1.0, 0.0] };
    let dot = a[0] * fallback[0] + a[1] * fallback[1] + a[2] * fallback[2];
    let proj = [a[0] * dot, a[1] * dot, a[2] * dot];
    let raw = [fallback[0] - proj[0], fallback[1] - proj[1], fallback[2] - proj[2]];
    let len = (raw[0] * raw[0] + raw[1] * raw[1] + raw[2] * raw[2]).sqrt();
    [raw[0] / len, raw[1] / len, raw[2] / len]
}

fn aag_vec(v: [f64; 3]) -> [f64; 3] {
    v
}

fn bore_face(fid: Fid, axis: [f64; 3], radius: f64) -> FaceAttributes {
    let radial = orthogonal_unit(axis);
    let centroid = [radial[0] * radius, radial[1] * radius, radial[2] * radius];
    let inward_normal = [-radial[0], -radial[1], -radial[2]];
    FaceAttributes {
        fid,
        kind: SurfaceKind::Cylinder,
        params: SurfaceParams::Cylinder { origin: [0.0, 0.0, 0.0], axis, radius },
        area_mm2: 2.0 * std::f64::consts::PI * radius * 10.0,
        normal: inward_normal,
        centroid,
        bounding_arcs: vec![BoundingArc { center: [0.0, 0.0, 0.0], axis, span_deg: 180.0 }],
        linear_edge_count: 0,
        bbox_max_extent_mm: 2.0 * radius,
        bbox_min_extent_mm: 2.0 * radius,
    }
}
