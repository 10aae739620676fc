//! lumo tracer - CPU Monte Carlo path tracing core.
//!
//! Turns one (camera ray, scene, seed) triple into one radiance sample.
//! Sample accumulation, parallel dispatch over pixels, and image encoding
//! belong to the caller; every path is independent and the scene is
//! immutable, so `trace_path` may be invoked from any number of threads.

mod camera;
mod disney;
mod hit;
mod integrator;
mod light;
mod material;
mod mesh;
mod primitive;
mod quad;
mod sampling;
mod scene;
mod sphere;
mod texture;

pub use camera::Camera;
pub use disney::{Principled, PrincipledKind};
pub use hit::{GeomHit, HitRecord};
pub use integrator::{trace_path, trace_path_with, Background, Payload, TraceConfig};
pub use light::{Light, LightSample, LightShape};
pub use material::{Color, Dielectric, Emissive, Lambertian, Material, Metal, ScatterRay};
pub use mesh::TriangleMesh;
pub use primitive::Primitive;
pub use quad::Quad;
pub use scene::{MaterialId, Scene, SceneBuilder, SceneError};
pub use sphere::Sphere;
pub use texture::Texture;

/// Re-export common math types from lumo_math
pub use lumo_math::{Aabb, Interval, Onb, Ray, Vec2, Vec3};
