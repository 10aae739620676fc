//! Closed set of traceable primitive kinds.

use crate::hit::GeomHit;
use crate::mesh::TriangleMesh;
use crate::quad::Quad;
use crate::sphere::Sphere;
use lumo_math::{Interval, Ray};

/// The primitive kinds the tracer knows about.
///
/// A closed enum instead of trait objects: the kind set is fixed, matches
/// stay exhaustive, and dispatch is a jump, not a vtable call.
pub enum Primitive {
    Sphere(Sphere),
    Quad(Quad),
    Mesh(TriangleMesh),
}

impl Primitive {
    /// Test the ray against this primitive within the given interval.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<GeomHit> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Quad(q) => q.hit(ray, ray_t),
            Primitive::Mesh(m) => m.hit(ray, ray_t),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Quad> for Primitive {
    fn from(q: Quad) -> Self {
        Primitive::Quad(q)
    }
}

impl From<TriangleMesh> for Primitive {
    fn from(m: TriangleMesh) -> Self {
        Primitive::Mesh(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumo_math::Vec3;

    #[test]
    fn test_enum_dispatch() {
        let prim: Primitive = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 1.0).into();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let rec = prim.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-4);
    }
}
