//! Path integrator: turns one camera ray into one radiance sample.

use crate::disney::{Principled, PrincipledKind};
use crate::hit::HitRecord;
use crate::material::{Color, Material};
use crate::scene::Scene;
use lumo_math::{Interval, Ray};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// What a ray sees when it escapes the scene.
#[derive(Debug, Clone, Copy)]
pub enum Background {
    /// Constant radiance in every direction.
    Solid(Color),
    /// Vertical gradient blended by the unit ray direction's y.
    VerticalGradient { top: Color, bottom: Color },
}

impl Background {
    fn shade(&self, ray: &Ray) -> Color {
        match *self {
            Background::Solid(color) => color,
            Background::VerticalGradient { top, bottom } => {
                let y = ray.direction.normalize_or_zero().y;
                let a = (y + 1.0) / 2.0;
                a * top + (1.0 - a) * bottom
            }
        }
    }
}

/// Fixed per-render tracing configuration.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Paths whose throughput length falls below this are cut off
    pub min_intensity: f32,
    /// Self-intersection guard: hits closer than this are ignored
    pub epsilon_t: f32,
    /// Color assigned to paths cut off by the depth or intensity budget
    pub absorb_color: Color,
    /// Environment contribution for rays that miss everything
    pub background: Background,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 50,
            min_intensity: 0.01,
            epsilon_t: 1e-3,
            absorb_color: Color::ZERO,
            background: Background::Solid(Color::ZERO),
        }
    }
}

/// Per-path bookkeeping, created fresh for every camera sample.
#[derive(Debug, Clone, Copy)]
pub struct Payload {
    /// Accumulated throughput from the camera to this ray
    pub attenuation: Color,
    /// Bounce count; camera rays start at 1
    pub age: u32,
    /// Whether an emissive hit still contributes (false right after a
    /// lobe whose direct light was explicitly sampled)
    pub count_emitted: bool,
}

impl Payload {
    fn root() -> Self {
        Self {
            attenuation: Color::ONE,
            age: 1,
            count_emitted: true,
        }
    }
}

/// Trace one path and return its radiance sample (linear RGB).
///
/// The single entry point invoked once per (pixel, sample) pair. `seed`
/// must differ per pair; each call owns an independent RNG stream, so any
/// number of calls may run in parallel against the same scene.
pub fn trace_path(ray: Ray, scene: &Scene, config: &TraceConfig, seed: u64) -> Color {
    let mut rng = SmallRng::seed_from_u64(seed);
    trace_path_with(ray, scene, config, &mut rng)
}

/// Trace one path using a caller-provided RNG stream.
pub fn trace_path_with(
    ray: Ray,
    scene: &Scene,
    config: &TraceConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut radiance = Color::ZERO;

    // Explicit work stack instead of recursion: materials may fan out
    // into several children, and depth stays bounded either way.
    let mut stack = vec![(ray, Payload::root())];

    while let Some((ray, payload)) = stack.pop() {
        // Depth and intensity budget
        if payload.age > config.max_depth || payload.attenuation.length() < config.min_intensity {
            radiance += payload.attenuation * config.absorb_color;
            continue;
        }

        let range = Interval::new(config.epsilon_t, f32::INFINITY);
        let Some(rec) = scene.nearest_hit(&ray, range) else {
            radiance += payload.attenuation * config.background.shade(&ray);
            continue;
        };

        if payload.count_emitted {
            radiance += payload.attenuation * rec.material.emitted();
        }

        // Next-event estimation for principled surface lobes
        if let Material::Principled(p) = rec.material {
            if p.kind == PrincipledKind::Surface {
                radiance += payload.attenuation * direct_light(scene, &rec, p, &ray, config, rng);
            }
        }

        for child in rec
            .material
            .scatter(&ray, &rec, payload.age, scene.textures(), rng)
        {
            // A degenerate lobe must degrade to black, never poison the sum
            if !child.weight.is_finite() {
                continue;
            }
            stack.push((
                child.ray,
                Payload {
                    attenuation: payload.attenuation * child.weight,
                    age: payload.age + 1,
                    count_emitted: child.count_emitted,
                },
            ));
        }
    }

    if radiance.is_finite() {
        radiance
    } else {
        config.absorb_color
    }
}

/// Estimate direct lighting at a hit by sampling every area light once.
///
/// Per light: `emission * f(L) * |N.L| * |N_light.(-L)| / dist^2 / pdf_area`,
/// gated by a shadow ray. With no lights the contribution is zero.
fn direct_light(
    scene: &Scene,
    rec: &HitRecord,
    material: &Principled,
    ray_in: &Ray,
    config: &TraceConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let v = -ray_in.direction.normalize();
    let base_color = material.base_color_at(rec, scene.textures());
    let mut sum = Color::ZERO;

    for light in scene.lights() {
        let sample = light.sample(rng);
        let to_light = sample.point - rec.p;
        let dist_sq = to_light.length_squared();
        if dist_sq <= 1e-8 {
            continue;
        }

        let dist = dist_sq.sqrt();
        let l = to_light / dist;

        let n_dot_l = rec.normal.dot(l);
        if n_dot_l <= 0.0 {
            continue;
        }

        // Area lights are double-sided; the light's own body still
        // occludes samples on its far half
        let light_cos = sample.normal.dot(-l).abs();
        if light_cos <= 1e-6 {
            continue;
        }

        if !scene.visible(rec.p, sample.point, config.epsilon_t) {
            continue;
        }

        let h = (l + v).normalize();
        let f = material.eval(base_color, rec.normal, l, v, h);
        sum += light.emission() * f * n_dot_l * light_cos / dist_sq / sample.pdf_area;
    }

    sum
}
