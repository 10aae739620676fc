//! Sphere primitive.

use crate::hit::GeomHit;
use lumo_math::{Interval, Ray, Vec3};
use std::f32::consts::PI;

/// A sphere primitive.
///
/// A negative radius is legal and flips the outward normal, which is how
/// hollow glass shells are modeled (an inner sphere of negative radius
/// inside an outer one).
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Test the ray against the sphere within the given interval.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<GeomHit> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - self.center) / self.radius;
        let (u, v) = sphere_uv(outward_normal);

        Some(GeomHit {
            t: root,
            p,
            outward_normal,
            u,
            v,
        })
    }
}

/// UV coordinates for a point on the unit sphere.
///
/// theta: angle down from +Y; phi: angle around Y from +X.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .expect("ray through center must hit");

        assert!((rec.t - 0.5).abs() < 0.001);
        assert!((rec.outward_normal - Vec3::Z).length() < 0.001);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_smaller_root_preferred() {
        // Unit sphere at origin, axis-aligned ray through the center:
        // entry at t=1, exit at t=3. The smaller root in range wins.
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);

        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-4);

        // Excluding the near root selects the far one
        let rec = sphere.hit(&ray, Interval::new(1.5, f32::INFINITY)).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-4);

        // Excluding both roots misses
        assert!(sphere.hit(&ray, Interval::new(3.5, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_negative_radius_flips_normal() {
        // Hollow-shell convention: a negative radius yields an inward normal
        let sphere = Sphere::new(Vec3::ZERO, -1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);

        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.outward_normal + Vec3::Z).length() < 1e-4);
    }
}
