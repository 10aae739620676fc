//! Quad primitive (parallelogram spanned by two edge vectors).

use crate::hit::GeomHit;
use lumo_math::{Interval, Ray, Vec3};

/// A quad anchored at a corner and spanned by two edge vectors.
///
/// The plane (unit normal and offset) and the edge vectors divided by
/// their own squared length are precomputed, so the inside test is two
/// dot products against `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Quad {
    anchor: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    // edges scaled by 1 / |edge|^2 for hit-point projection
    w1: Vec3,
    w2: Vec3,
    normal: Vec3,
    d: f32,
}

impl Quad {
    /// Create a quad from an anchor corner and two edge vectors.
    pub fn new(anchor: Vec3, edge1: Vec3, edge2: Vec3) -> Self {
        let normal = edge1.cross(edge2).normalize_or_zero();
        let d = normal.dot(anchor);
        let w1 = edge1 / edge1.length_squared();
        let w2 = edge2 / edge2.length_squared();

        Self {
            anchor,
            edge1,
            edge2,
            w1,
            w2,
            normal,
            d,
        }
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn edge1(&self) -> Vec3 {
        self.edge1
    }

    pub fn edge2(&self) -> Vec3 {
        self.edge2
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Test the ray against the quad within the given interval.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<GeomHit> {
        let denom = self.normal.dot(ray.direction);

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        // Project the hit offset onto the edge vectors
        let p = ray.at(t);
        let rel = p - self.anchor;
        let a1 = self.w1.dot(rel);
        let a2 = self.w2.dot(rel);

        if !(0.0..=1.0).contains(&a1) || !(0.0..=1.0).contains(&a2) {
            return None;
        }

        Some(GeomHit {
            t,
            p,
            outward_normal: self.normal,
            u: a1,
            v: a2,
        })
    }
}
