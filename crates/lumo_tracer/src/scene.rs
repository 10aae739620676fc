//! Scene assembly and the nearest-hit query.

use crate::hit::HitRecord;
use crate::light::Light;
use crate::material::{Emissive, Material};
use crate::primitive::Primitive;
use crate::texture::Texture;
use lumo_math::{Interval, Ray, Vec3};
use log::debug;
use thiserror::Error;

/// Index into the scene's material table.
pub type MaterialId = usize;

/// Configuration errors detected when assembling a scene.
///
/// All of these are unrecoverable and reported before any path is traced;
/// numerical degeneracies during tracing are handled locally instead.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("object {object} references unknown material {material}")]
    UnknownMaterial { object: usize, material: usize },

    #[error("material {material} references unknown texture {texture}")]
    UnknownTexture { material: usize, texture: usize },

    #[error("texture {texture} has {got} pixels, expected {expected}")]
    TextureSize {
        texture: usize,
        got: usize,
        expected: usize,
    },

    #[error("light {light} has a degenerate shape (zero radius or zero area)")]
    DegenerateLight { light: usize },

    #[error("mesh in object {object} has no triangles")]
    EmptyMesh { object: usize },

    #[error("mesh in object {object} references vertex {index} out of {count}")]
    MeshIndexOutOfRange {
        object: usize,
        index: u32,
        count: usize,
    },

    #[error("mesh in object {object} has an attribute buffer of length {got}, expected {expected}")]
    MeshAttributeMismatch {
        object: usize,
        got: usize,
        expected: usize,
    },
}

struct Object {
    primitive: Primitive,
    material: MaterialId,
}

/// Accumulates primitives, materials, textures, and lights, then
/// validates the whole configuration at once.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<Object>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    lights: Vec<Light>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material and get its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Register a decoded texture and get its index.
    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Add a primitive instance bound to a registered material.
    pub fn add_object(&mut self, primitive: impl Into<Primitive>, material: MaterialId) -> &mut Self {
        self.objects.push(Object {
            primitive: primitive.into(),
            material,
        });
        self
    }

    /// Add an area light.
    ///
    /// The light is registered for explicit sampling *and* instanced as an
    /// emissive object, so rays that hit it directly see the same emission.
    pub fn add_light(&mut self, light: Light) -> &mut Self {
        let material = self.add_material(Material::Emissive(Emissive::new(light.emission())));
        self.objects.push(Object {
            primitive: light.primitive(),
            material,
        });
        self.lights.push(light);
        self
    }

    /// Validate the configuration and produce an immutable scene.
    pub fn build(self) -> Result<Scene, SceneError> {
        for (i, object) in self.objects.iter().enumerate() {
            if object.material >= self.materials.len() {
                return Err(SceneError::UnknownMaterial {
                    object: i,
                    material: object.material,
                });
            }
            if let Primitive::Mesh(mesh) = &object.primitive {
                validate_mesh(i, mesh)?;
            }
        }

        for (i, material) in self.materials.iter().enumerate() {
            if let Material::Principled(p) = material {
                if let Some(texture) = p.albedo_tex {
                    if texture >= self.textures.len() {
                        return Err(SceneError::UnknownTexture {
                            material: i,
                            texture,
                        });
                    }
                }
            }
        }

        for (i, texture) in self.textures.iter().enumerate() {
            let expected = (texture.width() * texture.height()) as usize;
            if texture.pixel_count() != expected {
                return Err(SceneError::TextureSize {
                    texture: i,
                    got: texture.pixel_count(),
                    expected,
                });
            }
        }

        for (i, light) in self.lights.iter().enumerate() {
            if light.area() <= 0.0 || !light.area().is_finite() {
                return Err(SceneError::DegenerateLight { light: i });
            }
        }

        debug!(
            "scene built: {} objects, {} materials, {} textures, {} lights",
            self.objects.len(),
            self.materials.len(),
            self.textures.len(),
            self.lights.len()
        );

        Ok(Scene {
            objects: self.objects,
            materials: self.materials,
            textures: self.textures,
            lights: self.lights,
        })
    }
}

fn validate_mesh(object: usize, mesh: &crate::mesh::TriangleMesh) -> Result<(), SceneError> {
    if mesh.triangle_count() == 0 {
        return Err(SceneError::EmptyMesh { object });
    }

    let count = mesh.vertex_count();
    for tri in mesh.indices() {
        for &index in tri {
            if index as usize >= count {
                return Err(SceneError::MeshIndexOutOfRange {
                    object,
                    index,
                    count,
                });
            }
        }
    }

    for got in [mesh.normals_len(), mesh.uvs_len()].into_iter().flatten() {
        if got != count {
            return Err(SceneError::MeshAttributeMismatch {
                object,
                got,
                expected: count,
            });
        }
    }

    Ok(())
}

/// An immutable collection of primitives, materials, and lights.
///
/// The only query is [`Scene::nearest_hit`]; swapping the linear scan for
/// an acceleration structure changes nothing else in the tracer.
pub struct Scene {
    objects: Vec<Object>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    lights: Vec<Light>,
}

impl Scene {
    /// Find the globally nearest hit along the ray within the interval.
    pub fn nearest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut nearest = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let range = Interval::new(ray_t.min, closest_so_far);
            if let Some(geom) = object.primitive.hit(ray, range) {
                closest_so_far = geom.t;
                nearest = Some((geom, object.material));
            }
        }

        nearest.map(|(geom, material)| HitRecord::new(ray, geom, &self.materials[material]))
    }

    /// Shadow query: is the segment from `from` to `to` unobstructed?
    ///
    /// `t_max` stops just short of the target so the surface being sampled
    /// does not occlude itself.
    pub fn visible(&self, from: Vec3, to: Vec3, epsilon_t: f32) -> bool {
        let offset = to - from;
        let distance = offset.length();
        if distance <= epsilon_t {
            return true;
        }

        let ray = Ray::new(from, offset / distance);
        self.nearest_hit(&ray, Interval::new(epsilon_t, distance - 1e-3))
            .is_none()
    }

    /// The registered area lights.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The decoded texture table.
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }
}
