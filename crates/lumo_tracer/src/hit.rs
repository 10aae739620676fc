//! Hit records for ray-primitive intersection.

use crate::material::Material;
use lumo_math::{Ray, Vec3};

/// Geometry-only intersection result produced by primitives.
///
/// `outward_normal` points away from the surface as defined by the
/// primitive (sphere center, quad plane, triangle winding); the sign is
/// resolved against the ray when building a [`HitRecord`].
#[derive(Debug, Clone, Copy)]
pub struct GeomHit {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal as defined by the primitive
    pub outward_normal: Vec3,
    /// UV surface coordinates
    pub u: f32,
    pub v: f32,
}

/// A geometric hit resolved against the ray and bound to a material.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// UV surface coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    /// Resolve a geometric hit against the incoming ray.
    ///
    /// The normal is always stored pointing against the ray direction;
    /// `front_face` records which side was hit.
    pub fn new(ray: &Ray, geom: GeomHit, material: &'a Material) -> Self {
        let front_face = ray.direction.dot(geom.outward_normal) < 0.0;
        let normal = if front_face {
            geom.outward_normal
        } else {
            -geom.outward_normal
        };

        Self {
            p: geom.p,
            normal,
            t: geom.t,
            u: geom.u,
            v: geom.v,
            front_face,
            material,
        }
    }
}
