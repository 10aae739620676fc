//! Indexed triangle mesh primitive.
//!
//! Uses the Möller-Trumbore algorithm per triangle, with a whole-mesh
//! bounding-box early-out.

use crate::hit::GeomHit;
use lumo_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Determinant threshold below which a triangle is treated as parallel or
/// degenerate. An epsilon test, not a hard zero compare, to avoid
/// catastrophic cancellation.
const DEGENERATE_EPS: f32 = 1e-8;

/// An indexed triangle mesh with optional per-vertex normals and UVs.
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    normals: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    bbox: Aabb,
}

impl TriangleMesh {
    /// Create a mesh from a vertex buffer and a triangle index buffer.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        let bbox = vertices
            .iter()
            .fold(Aabb::EMPTY, |acc, &p| acc.include(p));

        Self {
            vertices,
            indices,
            normals: None,
            uvs: None,
            bbox,
        }
    }

    /// Attach a per-vertex normal buffer (smooth shading).
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Attach a per-vertex UV buffer.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub(crate) fn normals_len(&self) -> Option<usize> {
        self.normals.as_ref().map(|n| n.len())
    }

    pub(crate) fn uvs_len(&self) -> Option<usize> {
        self.uvs.as_ref().map(|t| t.len())
    }

    /// Test the ray against every triangle, keeping the nearest hit.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<GeomHit> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let mut closest: Option<GeomHit> = None;
        let mut closest_t = ray_t.max;

        for tri in &self.indices {
            let range = Interval::new(ray_t.min, closest_t);
            if let Some(hit) = self.hit_triangle(*tri, ray, range) {
                closest_t = hit.t;
                closest = Some(hit);
            }
        }

        closest
    }

    /// Möller-Trumbore ray-triangle intersection.
    fn hit_triangle(&self, tri: [u32; 3], ray: &Ray, ray_t: Interval) -> Option<GeomHit> {
        let [i0, i1, i2] = tri;
        let a = self.vertices[i0 as usize];
        let b = self.vertices[i1 as usize];
        let c = self.vertices[i2 as usize];

        let edge1 = b - a;
        let edge2 = c - a;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // Parallel or degenerate triangle
        if det.abs() < DEGENERATE_EPS {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin - a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        // Winding (b - a) x (c - b) defines the front-facing normal;
        // it equals edge1 x edge2.
        let face_normal = edge1.cross(edge2).normalize();
        let outward_normal = match &self.normals {
            Some(ns) => {
                let n = (1.0 - u - v) * ns[i0 as usize]
                    + u * ns[i1 as usize]
                    + v * ns[i2 as usize];
                n.normalize_or(face_normal)
            }
            None => face_normal,
        };

        let (tu, tv) = match &self.uvs {
            Some(uvs) => {
                let uv = (1.0 - u - v) * uvs[i0 as usize]
                    + u * uvs[i1 as usize]
                    + v * uvs[i2 as usize];
                (uv.x, uv.y)
            }
            None => (u, v),
        };

        Some(GeomHit {
            t,
            p: ray.at(t),
            outward_normal,
            u: tu,
            v: tv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> TriangleMesh {
        // Triangle in the z = -1 plane
        TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(0.0, 1.0, -1.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_triangle_hit() {
        let mesh = single_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = mesh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 0.001);
        assert!((rec.outward_normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_triangle_miss() {
        let mesh = single_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(mesh.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_degenerate_triangle_rejected() {
        // All three vertices collinear; the determinant stays under the
        // epsilon and the triangle can never be hit
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(2.0, 0.0, -1.0),
            ],
            vec![[0, 1, 2]],
        );

        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(mesh.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_nearest_triangle_wins() {
        // Two stacked triangles; the closer one must be reported
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(0.0, 1.0, -1.0),
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(1.0, -1.0, -2.0),
                Vec3::new(0.0, 1.0, -2.0),
            ],
            vec![[3, 4, 5], [0, 1, 2]],
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = mesh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_uvs_interpolated() {
        let mesh = single_triangle().with_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.5, 1.0),
        ]);

        // Hit near vertex 2: UVs approach (0.5, 1.0)
        let ray = Ray::new(Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = mesh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.u - 0.5).abs() < 0.05);
        assert!(rec.v > 0.9);
    }

    #[test]
    fn test_smooth_normals_interpolated() {
        let mesh = single_triangle().with_normals(vec![
            Vec3::new(1.0, 0.0, 1.0).normalize(),
            Vec3::new(-1.0, 0.0, 1.0).normalize(),
            Vec3::Z,
        ]);

        // Hit near vertex 2: the interpolated normal leans toward Vec3::Z
        let ray = Ray::new(Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = mesh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!(rec.outward_normal.dot(Vec3::Z) > 0.9);
    }
}
