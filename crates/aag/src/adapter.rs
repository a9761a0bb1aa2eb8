//! The narrow seam between the graph/recognizer layer and the B-rep kernel.
//!
//! `GeometryAdapter` is the only trait that names `cad-kernel` types in its
//! signature; everything above this module addresses faces and edges purely
//! by `Fid`/`Eid`. Swapping the kernel for a different one only requires a
//! new impl of this trait.

use cad_kernel::geometry::curves::Curve;
use cad_kernel::geometry::surfaces::Surface;
use cad_kernel::geometry::vector::Vec3;
use cad_kernel::topology::brep::{EntityStore, FaceId, SolidId};

use crate::graph::{BoundingArc, Eid, Fid, SurfaceKind, SurfaceParams};

/// Inputs to the signed dihedral angle calculation for one shared edge: a
/// shared tangent direction and the two faces' outward normals sampled near
/// the edge.
#[derive(Debug, Clone, Copy)]
pub struct DihedralSample {
    pub tangent: [f64; 3],
    pub normal_a: [f64; 3],
    pub normal_b: [f64; 3],
}

/// The geometry-adapter contract (spec §4.1): pure queries over a single
/// loaded shape, no mutation, failures surfaced as `Option`/empty results
/// rather than exceptions.
pub trait GeometryAdapter {
    fn face_count(&self) -> usize;
    fn surface_kind(&self, fid: Fid) -> SurfaceKind;
    fn surface_params(&self, fid: Fid) -> SurfaceParams;
    fn face_area(&self, fid: Fid) -> f64;
    fn face_centroid(&self, fid: Fid) -> [f64; 3];
    fn face_normal_at_centroid(&self, fid: Fid) -> [f64; 3];
    fn bounding_arcs(&self, fid: Fid) -> Vec<BoundingArc>;
    fn linear_edge_count(&self, fid: Fid) -> usize;
    fn bbox_max_extent(&self, fid: Fid) -> f64;
    /// Smallest non-degenerate axis-aligned extent of the face's boundary
    /// loop (the narrow dimension, as opposed to `bbox_max_extent`'s long
    /// one).
    fn bbox_min_extent(&self, fid: Fid) -> f64;

    /// Interior edges of the shape (exactly two incident faces), each
    /// assigned a stable `Eid` in first-seen order during this call.
    fn interior_edges(&self) -> Vec<(Eid, Fid, Fid)>;

    fn dihedral_sample(&self, eid: Eid) -> Option<DihedralSample>;

    /// Cast a ray from `origin` along `direction`, returning faces hit by
    /// their (infinite) underlying surface and the hit distance, nearest
    /// first. The kernel's ray/surface routines test against the face's
    /// unbounded surface, not its trimmed boundary — an accepted
    /// approximation for thickness sampling, where the ray is cast from a
    /// point already known to lie within the opposing face's footprint.
    fn cast_ray(&self, origin: [f64; 3], direction: [f64; 3]) -> Vec<(Fid, f64)>;
}

/// `GeometryAdapter` backed directly by a `cad-kernel` `EntityStore`.
pub struct KernelAdapter<'a> {
    store: &'a EntityStore,
    face_order: Vec<FaceId>,
}

impl<'a> KernelAdapter<'a> {
    pub fn new(store: &'a EntityStore, solid_id: SolidId) -> Self {
        let face_order = store.faces_in_order(solid_id);
        Self { store, face_order }
    }

    fn face_id(&self, fid: Fid) -> FaceId {
        self.face_order[fid as usize]
    }

    fn fid_of(&self, face_id: FaceId) -> Option<Fid> {
        self.face_order.iter().position(|&f| f == face_id).map(|i| i as Fid)
    }

    /// `(min, max)` axis-aligned extent of the face's boundary loop, in mm.
    /// `min` ignores degenerate (near-zero) axis deltas so a face lying
    /// exactly in a coordinate plane still reports its true in-plane width.
    fn bbox_extents(&self, fid: Fid) -> (f64, f64) {
        let face = &self.store.faces[self.face_id(fid)];
        let loop_data = &self.store.loops[face.outer_loop];
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for &he_id in &loop_data.half_edges {
            let p = self.store.vertices[self.store.half_edges[he_id].start_vertex].point.to_array();
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        let deltas: Vec<f64> = (0..3).map(|i| max[i] - min[i]).collect();
        let largest = deltas.iter().cloned().fold(0.0, f64::max);
        let smallest = deltas
            .iter()
            .cloned()
            .filter(|d| *d > 1e-6)
            .fold(f64::INFINITY, f64::min);
        (if smallest.is_finite() { smallest } else { largest }, largest)
    }
}

fn surface_kind_of(surface: &Surface) -> SurfaceKind {
    match surface {
        Surface::Plane(_) => SurfaceKind::Plane,
        Surface::Cylinder(_) => SurfaceKind::Cylinder,
        Surface::Cone(_) => SurfaceKind::Cone,
        Surface::Sphere(_) => SurfaceKind::Sphere,
        Surface::Torus(_) => SurfaceKind::Torus,
        Surface::Nurbs(_) => SurfaceKind::BSpline,
    }
}

fn surface_params_of(surface: &Surface) -> SurfaceParams {
    match surface {
        Surface::Plane(p) => SurfaceParams::Plane {
            point: p.origin.to_array(),
            normal: p.normal.to_array(),
        },
        Surface::Cylinder(c) => SurfaceParams::Cylinder {
            origin: c.origin.to_array(),
            axis: c.axis.to_array(),
            radius: c.radius,
        },
        Surface::Cone(c) => SurfaceParams::Cone {
            apex: c.apex.to_array(),
            axis: c.axis.to_array(),
            half_angle: c.half_angle,
        },
        Surface::Sphere(s) => SurfaceParams::Sphere {
            center: s.center.to_array(),
            radius: s.radius,
        },
        Surface::Torus(t) => SurfaceParams::Torus {
            center: t.center.to_array(),
            axis: t.axis.to_array(),
            major_radius: t.major_radius,
            minor_radius: t.minor_radius,
        },
        Surface::Nurbs(_) => SurfaceParams::Other,
    }
}

impl<'a> GeometryAdapter for KernelAdapter<'a> {
    fn face_count(&self) -> usize {
        self.face_order.len()
    }

    fn surface_kind(&self, fid: Fid) -> SurfaceKind {
        surface_kind_of(&self.store.faces[self.face_id(fid)].surface)
    }

    fn surface_params(&self, fid: Fid) -> SurfaceParams {
        surface_params_of(&self.store.faces[self.face_id(fid)].surface)
    }

    fn face_area(&self, fid: Fid) -> f64 {
        self.store.face_area(self.face_id(fid))
    }

    fn face_centroid(&self, fid: Fid) -> [f64; 3] {
        let face_id = self.face_id(fid);
        let face = &self.store.faces[face_id];
        let loop_data = &self.store.loops[face.outer_loop];
        let mut sum = Vec3::ZERO;
        let mut count = 0.0;
        for &he_id in &loop_data.half_edges {
            let p = self.store.vertices[self.store.half_edges[he_id].start_vertex].point;
            sum = sum + p.to_vec3();
            count += 1.0;
        }
        if count == 0.0 {
            return [0.0; 3];
        }
        (sum / count).to_array()
    }

    fn face_normal_at_centroid(&self, fid: Fid) -> [f64; 3] {
        self.store.face_normal(self.face_id(fid), 0.5, 0.5).to_array()
    }

    fn bounding_arcs(&self, fid: Fid) -> Vec<BoundingArc> {
        let face = &self.store.faces[self.face_id(fid)];
        let loop_data = &self.store.loops[face.outer_loop];
        let mut arcs = Vec::new();
        for &he_id in &loop_data.half_edges {
            let he = self.store.half_edges[he_id];
            let edge = &self.store.edges[he.edge];
            if let Curve::Circle(circle) = &edge.curve {
                let span = (he.t_end - he.t_start).abs().to_degrees();
                arcs.push(BoundingArc {
                    center: circle.center.to_array(),
                    axis: circle.normal.to_array(),
                    span_deg: span,
                });
            }
        }
        arcs
    }

    fn linear_edge_count(&self, fid: Fid) -> usize {
        let face = &self.store.faces[self.face_id(fid)];
        let loop_data = &self.store.loops[face.outer_loop];
        loop_data
            .half_edges
            .iter()
            .filter(|&&he_id| {
                let he = self.store.half_edges[he_id];
                matches!(self.store.edges[he.edge].curve, Curve::Line(_))
            })
            .count()
    }

    fn bbox_max_extent(&self, fid: Fid) -> f64 {
        self.bbox_extents(fid).1
    }

    fn bbox_min_extent(&self, fid: Fid) -> f64 {
        self.bbox_extents(fid).0
    }

    fn interior_edges(&self) -> Vec<(Eid, Fid, Fid)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        let mut next_eid: Eid = 0;
        for &face_id in &self.face_order {
            let face = &self.store.faces[face_id];
            let loop_data = &self.store.loops[face.outer_loop];
            for &he_id in &loop_data.half_edges {
                let he = self.store.half_edges[he_id];
                let edge_key = {
                    use slotmap::Key;
                    he.edge.data().as_ffi()
                };
                if !seen.insert(edge_key) {
                    continue;
                }
                let twin = self.store.half_edges[he.twin];
                let other_face = twin.face;
                if other_face == he.face {
                    continue;
                }
                let (Some(a), Some(b)) = (self.fid_of(he.face), self.fid_of(other_face)) else {
                    continue;
                };
                out.push((next_eid, a, b));
                next_eid += 1;
            }
        }
        out
    }

    fn dihedral_sample(&self, eid: Eid) -> Option<DihedralSample> {
        let (_, a, b) = self.interior_edges().into_iter().find(|(e, _, _)| *e == eid)?;
        let face_a = &self.store.faces[self.face_id(a)];
        let loop_a = &self.store.loops[face_a.outer_loop];

        // Re-derive the shared half-edge for this eid by scanning face a's
        // boundary for a half-edge whose twin lies on face b.
        for &he_id in &loop_a.half_edges {
            let he = self.store.half_edges[he_id];
            let twin = self.store.half_edges[he.twin];
            if twin.face != self.face_id(b) {
                continue;
            }
            let edge = &self.store.edges[he.edge];
            let t_mid = (he.t_start + he.t_end) * 0.5;
            let tangent = match &edge.curve {
                Curve::Line(line) => line.direction,
                Curve::Circle(circle) => circle.derivative(t_mid).normalized().unwrap_or(Vec3::X),
                _ => {
                    let p0 = edge.curve.evaluate(t_mid);
                    let p1 = edge.curve.evaluate(t_mid + 1e-4);
                    (p1 - p0).normalized().unwrap_or(Vec3::X)
                }
            };
            let normal_a = self.store.face_normal(self.face_id(a), 0.5, 0.5);
            let normal_b = self.store.face_normal(self.face_id(b), 0.5, 0.5);
            return Some(DihedralSample {
                tangent: tangent.to_array(),
                normal_a: normal_a.to_array(),
                normal_b: normal_b.to_array(),
            });
        }
        None
    }

    fn cast_ray(&self, origin: [f64; 3], direction: [f64; 3]) -> Vec<(Fid, f64)> {
        use cad_kernel::geometry::curves::Ray;
        use cad_kernel::geometry::intersection::{ray_cylinder, ray_plane, ray_sphere};
        use cad_kernel::geometry::point::Point3d;

        let ray = Ray::new(
            Point3d::new(origin[0], origin[1], origin[2]),
            Vec3::new(direction[0], direction[1], direction[2]),
        );
        let mut hits = Vec::new();
        for (fid, &face_id) in self.face_order.iter().enumerate() {
            let surface = &self.store.faces[face_id].surface;
            let best = match surface {
                Surface::Plane(p) => ray_plane(&ray, p).map(|h| h.t),
                Surface::Cylinder(c) => ray_cylinder(&ray, c).into_iter().map(|h| h.t).next(),
                Surface::Sphere(s) => ray_sphere(&ray, s).into_iter().map(|h| h.t).next(),
                _ => None,
            };
            if let Some(t) = best {
                hits.push((fid as Fid, t));
            }
        }
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        hits
    }
}
