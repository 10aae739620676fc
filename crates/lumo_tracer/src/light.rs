//! Area lights and light sampling for next-event estimation.

use crate::material::Color;
use crate::primitive::Primitive;
use crate::quad::Quad;
use crate::sampling::{gen_f32, random_unit_vector};
use crate::sphere::Sphere;
use lumo_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// The shapes an area light can take.
#[derive(Debug, Clone, Copy)]
pub enum LightShape {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    Quad {
        anchor: Vec3,
        edge1: Vec3,
        edge2: Vec3,
    },
}

/// An area light with a precomputed surface area.
///
/// Lights are also traceable geometry: the scene builder instantiates the
/// shape with an emissive material, so a scatter ray that happens to hit
/// the light surface sees the same emission an explicit sample reports.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    shape: LightShape,
    emission: Color,
    /// Unit normal for quad lights; unused for spheres
    normal: Vec3,
    area: f32,
}

/// A point sampled on a light surface.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub point: Vec3,
    pub normal: Vec3,
    /// Probability density with respect to surface area (1 / area)
    pub pdf_area: f32,
}

impl Light {
    /// Create a sphere light.
    pub fn sphere(center: Vec3, radius: f32, emission: Color) -> Self {
        Self {
            shape: LightShape::Sphere { center, radius },
            emission,
            normal: Vec3::Y,
            area: 4.0 * PI * radius * radius,
        }
    }

    /// Create a quad light from an anchor corner and two edge vectors.
    pub fn quad(anchor: Vec3, edge1: Vec3, edge2: Vec3, emission: Color) -> Self {
        let cross = edge1.cross(edge2);
        Self {
            shape: LightShape::Quad {
                anchor,
                edge1,
                edge2,
            },
            emission,
            normal: cross.normalize_or_zero(),
            area: cross.length(),
        }
    }

    pub fn shape(&self) -> LightShape {
        self.shape
    }

    pub fn emission(&self) -> Color {
        self.emission
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    /// Sample a point uniformly over the light's surface area.
    pub fn sample(&self, rng: &mut dyn RngCore) -> LightSample {
        match self.shape {
            LightShape::Sphere { center, radius } => {
                let normal = random_unit_vector(rng);
                LightSample {
                    point: center + radius * normal,
                    normal,
                    pdf_area: 1.0 / self.area,
                }
            }
            LightShape::Quad {
                anchor,
                edge1,
                edge2,
            } => {
                let point = anchor + gen_f32(rng) * edge1 + gen_f32(rng) * edge2;
                LightSample {
                    point,
                    normal: self.normal,
                    pdf_area: 1.0 / self.area,
                }
            }
        }
    }

    /// Instantiate the light's shape as traceable geometry.
    pub(crate) fn primitive(&self) -> Primitive {
        match self.shape {
            LightShape::Sphere { center, radius } => Sphere::new(center, radius).into(),
            LightShape::Quad {
                anchor,
                edge1,
                edge2,
            } => Quad::new(anchor, edge1, edge2).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sphere_light_area_and_samples() {
        let light = Light::sphere(Vec3::new(1.0, 2.0, 3.0), 0.5, Color::ONE);
        assert!((light.area() - 4.0 * PI * 0.25).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let s = light.sample(&mut rng);
            // Sampled points lie on the surface, normals point outward
            assert!(((s.point - Vec3::new(1.0, 2.0, 3.0)).length() - 0.5).abs() < 1e-4);
            assert!((s.normal.length() - 1.0).abs() < 1e-4);
            assert!((s.pdf_area - 1.0 / light.area()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_quad_light_area_and_samples() {
        let anchor = Vec3::new(-1.0, 2.0, -1.0);
        let edge1 = Vec3::new(2.0, 0.0, 0.0);
        let edge2 = Vec3::new(0.0, 0.0, 2.0);
        let light = Light::quad(anchor, edge1, edge2, Color::ONE);
        assert!((light.area() - 4.0).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let s = light.sample(&mut rng);
            // Samples stay in the light's plane, inside the parallelogram
            assert!((s.point.y - 2.0).abs() < 1e-5);
            assert!((-1.0..=1.0).contains(&s.point.x));
            assert!((-1.0..=1.0).contains(&s.point.z));
            assert!((s.pdf_area - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_quad_light_normal_matches_primitive() {
        // The sampled normal and the traceable geometry's normal agree,
        // so a random hit and an explicit sample see the same orientation
        let light = Light::quad(
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Color::ONE,
        );
        let mut rng = StdRng::seed_from_u64(42);
        let s = light.sample(&mut rng);

        if let Primitive::Quad(q) = light.primitive() {
            assert!((q.normal() - s.normal).length() < 1e-5);
        } else {
            panic!("quad light must instantiate a quad primitive");
        }
    }
}
