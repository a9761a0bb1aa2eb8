//! JSON and binary serialization of recognition results.

use serde::Serialize;

use crate::graph::Graph;
use crate::recognizers::Feature;

/// Feature listing as written to `features.json`: a bare array, one entry
/// per recognized feature, in recognizer-orchestration order.
pub fn features_to_json(features: &[Feature]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(features)
}

#[derive(Serialize)]
struct AagDump<'a> {
    nodes: &'a [crate::graph::FaceAttributes],
    arcs: &'a [crate::graph::Arc],
}

/// The AAG dump written to `aag.json`: every face node and every arc, with
/// no adjacency index (that's rebuilt on load by `Graph::new`).
pub fn graph_to_json(graph: &Graph) -> serde_json::Result<String> {
    let dump = AagDump { nodes: &graph.faces, arcs: &graph.arcs };
    serde_json::to_string_pretty(&dump)
}

/// The binary triangle-index → face-id map written alongside the mesh, one
/// little-endian `u32` per emitted triangle.
pub fn triangle_face_map(mesh: &cad_tessellation::TriangleMesh) -> Vec<u8> {
    mesh.tri_face_ids_to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FaceAttributes, SurfaceKind, SurfaceParams};
    use crate::recognizers::FeatureType;
    use std::collections::BTreeMap;

    #[test]
    fn test_features_to_json_round_trips_shape() {
        let feature = Feature {
            id: "hole_0001".to_string(),
            feature_type: FeatureType::Hole,
            subtype: Some("simple".to_string()),
            faces: vec![0, 1],
            params: BTreeMap::from([("radius_mm".to_string(), 3.0)]),
            source: "hole".to_string(),
            confidence: 0.9,
        };
        let json = features_to_json(&[feature]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["type"], "hole");
        assert_eq!(value[0]["id"], "hole_0001");
        assert_eq!(value[0]["faces"][1], 1);
    }

    #[test]
    fn test_graph_to_json_includes_nodes_and_arcs() {
        let faces = vec![FaceAttributes {
            fid: 0,
            kind: SurfaceKind::Plane,
            params: SurfaceParams::Plane { point: [0.0; 3], normal: [0.0, 0.0, 1.0] },
            area_mm2: 1.0,
            normal: [0.0, 0.0, 1.0],
            centroid: [0.0; 3],
            bounding_arcs: vec![],
            linear_edge_count: 4,
            bbox_max_extent_mm: 1.0,
            bbox_min_extent_mm: 1.0,
        }];
        let graph = Graph::new(faces, vec![]);
        let json = graph_to_json(&graph).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["nodes"].is_array());
        assert!(value["arcs"].is_array());
    }
}
