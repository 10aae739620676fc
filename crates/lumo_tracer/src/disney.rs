//! Principled (Disney) BRDF.
//!
//! Based on the 2012 Disney paper "Physically Based Shading at Disney"
//! and the 2015 extension for clearcoat and sheen.
//!
//! Sampling draws the half vector from the isotropic GTR2 distribution and
//! mixes with a cosine-weighted diffuse lobe; evaluation uses the full
//! anisotropic specular term. The pdf matches the sampler, which is what
//! the Monte Carlo weight `eval * |N.L| / pdf` requires.

use crate::hit::HitRecord;
use crate::material::{refract_or_reflect, Color, ScatterRay};
use crate::sampling::{cosine_sample_hemisphere, gen_f32};
use crate::texture::Texture;
use lumo_math::{Onb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Floor for roughness-derived alphas; keeps the microfacet
/// distributions away from their singular limit.
const MIN_ALPHA: f32 = 0.001;

/// Lobe selection for a principled material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipledKind {
    /// The full multi-lobe BRDF surface.
    Surface,
    /// Refractive variant: scatters through the dielectric path instead
    /// of the BRDF lobes.
    Glass,
}

/// Principled BRDF material with artist-friendly parameters.
#[derive(Clone)]
pub struct Principled {
    /// Base color (albedo for dielectrics, reflectance for metals)
    pub base_color: Color,

    /// Emitted light; nonzero turns the surface into an area emitter
    pub emission: Color,

    /// Metallic: 0 = dielectric, 1 = metal
    pub metallic: f32,

    /// Roughness: 0 = smooth/glossy, 1 = rough/diffuse
    pub roughness: f32,

    /// Specular: controls Fresnel reflectance at normal incidence
    pub specular: f32,

    /// Specular tint: tints the specular towards base_color
    pub specular_tint: f32,

    /// Anisotropic: aspect ratio for anisotropic reflection
    pub anisotropic: f32,

    /// Sheen: additional grazing component for cloth-like materials
    pub sheen: f32,

    /// Sheen tint: tints the sheen towards base_color
    pub sheen_tint: f32,

    /// Clearcoat: second specular lobe for car paint, lacquered wood
    pub clearcoat: f32,

    /// Clearcoat gloss: 0 = satin, 1 = gloss
    pub clearcoat_gloss: f32,

    /// Subsurface: blend to subsurface approximation
    pub subsurface: f32,

    /// Index of refraction, used by the glass variant only
    pub ior: f32,

    /// Lobe selection (surface BRDF or glass)
    pub kind: PrincipledKind,

    /// Optional albedo texture, an index into the scene's texture table
    pub albedo_tex: Option<usize>,
}

impl Default for Principled {
    fn default() -> Self {
        Self {
            base_color: Color::new(0.8, 0.8, 0.8),
            emission: Color::ZERO,
            metallic: 0.0,
            roughness: 0.5,
            specular: 0.5,
            specular_tint: 0.0,
            anisotropic: 0.0,
            sheen: 0.0,
            sheen_tint: 0.5,
            clearcoat: 0.0,
            clearcoat_gloss: 1.0,
            subsurface: 0.0,
            ior: 1.45,
            kind: PrincipledKind::Surface,
            albedo_tex: None,
        }
    }
}

impl Principled {
    /// Create a principled material with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simple diffuse material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            base_color: color,
            roughness: 1.0,
            specular: 0.0,
            ..Default::default()
        }
    }

    /// Create a metallic material.
    pub fn metal(color: Color, roughness: f32) -> Self {
        Self {
            base_color: color,
            metallic: 1.0,
            roughness,
            specular: 1.0,
            ..Default::default()
        }
    }

    /// Create a glossy plastic-like material.
    pub fn plastic(color: Color, roughness: f32) -> Self {
        Self {
            base_color: color,
            metallic: 0.0,
            roughness,
            specular: 0.5,
            ..Default::default()
        }
    }

    /// Create the refractive glass variant.
    pub fn glass(color: Color, ior: f32) -> Self {
        Self {
            base_color: color,
            ior,
            kind: PrincipledKind::Glass,
            ..Default::default()
        }
    }

    /// Builder method to set emission.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    /// Builder method to set metallic.
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set roughness.
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the albedo texture index.
    pub fn with_albedo_tex(mut self, index: usize) -> Self {
        self.albedo_tex = Some(index);
        self
    }

    /// Base color at a hit, resolving the albedo texture if present.
    pub(crate) fn base_color_at(&self, rec: &HitRecord, textures: &[Texture]) -> Color {
        match self.albedo_tex {
            Some(index) => textures[index].sample(rec.u, rec.v),
            None => self.base_color,
        }
    }

    /// Importance-sample an outgoing direction.
    ///
    /// Returns the light direction L and the half vector H actually used,
    /// both unit length.
    pub fn sample(&self, n: Vec3, v: Vec3, rng: &mut dyn RngCore) -> (Vec3, Vec3) {
        let diffuse_ratio = 0.5 * (1.0 - self.metallic);

        if gen_f32(rng) < diffuse_ratio {
            // Diffuse: cosine-weighted hemisphere
            let l = cosine_sample_hemisphere(n, rng);
            let h = (l + v).normalize();
            (l, h)
        } else {
            // Specular: GTR2 half vector, then mirror the view direction
            let onb = Onb::new(n);
            let a = self.roughness.max(MIN_ALPHA);
            let phi = gen_f32(rng) * 2.0 * PI;
            let r = gen_f32(rng);
            let cos_theta = ((1.0 - r) / (1.0 + (a * a - 1.0) * r)).sqrt();
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

            let h_local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
            let h = onb.to_world(h_local).normalize();
            let l = (2.0 * v.dot(h) * h - v).normalize();
            (l, h)
        }
    }

    /// Probability density of `sample` producing L (with half vector H).
    pub fn pdf(&self, n: Vec3, l: Vec3, h: Vec3) -> f32 {
        let diffuse_ratio = 0.5 * (1.0 - self.metallic);
        let specular_ratio = 1.0 - diffuse_ratio;

        let specular_alpha = self.roughness.max(MIN_ALPHA);
        let clearcoat_alpha = lerp(0.1, 0.001, self.clearcoat_gloss);

        let cos_theta = n.dot(h).abs();
        let pdf_gtr1 = gtr1(cos_theta, clearcoat_alpha) * cos_theta;
        let pdf_gtr2 = gtr2(cos_theta, specular_alpha) * cos_theta;

        // Half-vector pdf mixes the clearcoat and specular distributions,
        // then the reflection Jacobian maps it onto L
        let ratio = 1.0 / (1.0 + self.clearcoat);
        let pdf_h = lerp(pdf_gtr1, pdf_gtr2, ratio);
        let pdf_l = pdf_h / (4.0 * l.dot(h).abs().max(1e-8));

        let pdf_diffuse = n.dot(l).abs() / PI;

        diffuse_ratio * pdf_diffuse + specular_ratio * pdf_l
    }

    /// Evaluate the BRDF for light direction L, view direction V, and
    /// half vector H, with the base color already resolved.
    pub fn eval(&self, base_color: Color, n: Vec3, l: Vec3, v: Vec3, h: Vec3) -> Color {
        let n_dot_l = n.dot(l);
        let n_dot_v = n.dot(v);
        if n_dot_l <= 0.0 || n_dot_v <= 0.0 {
            return Color::ZERO;
        }

        let n_dot_h = n.dot(h);
        let l_dot_h = l.dot(h);

        let cd_lin = base_color;
        let cd_lum = luminance(cd_lin);
        let c_tint = if cd_lum > 0.0 {
            cd_lin / cd_lum
        } else {
            Color::ONE
        };
        let c_spec0 = (self.specular * 0.08 * Color::ONE.lerp(c_tint, self.specular_tint))
            .lerp(cd_lin, self.metallic);
        let c_sheen = Color::ONE.lerp(c_tint, self.sheen_tint);

        // Burley diffuse with retro-reflection at grazing angles
        let fl = schlick_weight(n_dot_l);
        let fv = schlick_weight(n_dot_v);
        let fd90 = 0.5 + 2.0 * l_dot_h * l_dot_h * self.roughness;
        let fd = lerp(1.0, fd90, fl) * lerp(1.0, fd90, fv);

        // Hanrahan-Krueger subsurface approximation
        let fss90 = l_dot_h * l_dot_h * self.roughness;
        let fss = lerp(1.0, fss90, fl) * lerp(1.0, fss90, fv);
        let ss = 1.25 * (fss * (1.0 / (n_dot_l + n_dot_v) - 0.5) + 0.5);

        // Anisotropic GGX specular
        let aspect = (1.0 - self.anisotropic * 0.9).sqrt();
        let ax = (square(self.roughness) / aspect).max(MIN_ALPHA);
        let ay = (square(self.roughness) * aspect).max(MIN_ALPHA);
        let onb = Onb::new(n);
        let x = onb.tangent;
        let y = n.cross(x).normalize();
        let ds = gtr2_aniso(n_dot_h, h.dot(x), h.dot(y), ax, ay);
        let fh = schlick_weight(l_dot_h);
        let fs = c_spec0.lerp(Color::ONE, fh);
        let gs = smith_g_ggx_aniso(n_dot_l, l.dot(x), l.dot(y), ax, ay)
            * smith_g_ggx_aniso(n_dot_v, v.dot(x), v.dot(y), ax, ay);

        let f_sheen = fh * self.sheen * c_sheen;

        // Clearcoat: GTR1 lobe with fixed 0.25 roughness for the G term
        let dr = gtr1(n_dot_h, lerp(0.1, 0.001, self.clearcoat_gloss));
        let fr = lerp(0.04, 1.0, fh);
        let gr = smith_g_ggx(n_dot_l, 0.25) * smith_g_ggx(n_dot_v, 0.25);

        ((1.0 / PI) * lerp(fd, ss, self.subsurface) * cd_lin + f_sheen)
            * (1.0 - self.metallic)
            + gs * fs * ds
            + 0.25 * self.clearcoat * gr * fr * dr * Color::ONE
    }

    /// Scatter an incoming ray; empty when the sampled lobe is invalid.
    pub(crate) fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        textures: &[Texture],
        rng: &mut dyn RngCore,
    ) -> Vec<ScatterRay> {
        let base_color = self.base_color_at(rec, textures);

        if self.kind == PrincipledKind::Glass {
            let direction =
                refract_or_reflect(ray_in.direction, rec.normal, rec.front_face, self.ior, rng);
            return vec![ScatterRay {
                ray: Ray::new(rec.p, direction),
                weight: base_color,
                count_emitted: true,
            }];
        }

        let v = -ray_in.direction.normalize();
        let n = rec.normal;

        let (l, h) = self.sample(n, v, rng);
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 {
            return Vec::new();
        }

        let pdf = self.pdf(n, l, h);
        if pdf <= 0.0 {
            return Vec::new();
        }

        let weight = self.eval(base_color, n, l, v, h) * n_dot_l / pdf;

        vec![ScatterRay {
            ray: Ray::new(rec.p, l),
            weight,
            // Direct light at the next vertex is collected by explicit
            // light sampling; a random light hit must not count twice
            count_emitted: false,
        }]
    }
}

// =============================================================================
// Helper functions
// =============================================================================

#[inline]
fn square(x: f32) -> f32 {
    x * x
}

/// Luminance weights used for the tint color.
#[inline]
fn luminance(c: Color) -> f32 {
    c.dot(Color::new(0.3, 0.6, 0.1))
}

/// Linear interpolation.
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Schlick weight (1 - cos)^5 for Fresnel.
#[inline]
fn schlick_weight(cos_theta: f32) -> f32 {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    let x2 = x * x;
    x2 * x2 * x
}

/// GTR1 (Berry) distribution, used by the clearcoat lobe.
#[inline]
fn gtr1(n_dot_h: f32, a: f32) -> f32 {
    if a >= 1.0 {
        return 1.0 / PI;
    }
    let a2 = a * a;
    let t = 1.0 + (a2 - 1.0) * n_dot_h * n_dot_h;
    (a2 - 1.0) / (PI * a2.ln() * t)
}

/// GTR2 (GGX/Trowbridge-Reitz) distribution, isotropic.
#[inline]
fn gtr2(n_dot_h: f32, a: f32) -> f32 {
    let a2 = a * a;
    let t = 1.0 + (a2 - 1.0) * n_dot_h * n_dot_h;
    a2 / (PI * t * t)
}

/// GTR2 distribution, anisotropic.
#[inline]
fn gtr2_aniso(n_dot_h: f32, h_dot_x: f32, h_dot_y: f32, ax: f32, ay: f32) -> f32 {
    let t = square(h_dot_x / ax) + square(h_dot_y / ay) + square(n_dot_h);
    1.0 / (PI * ax * ay * square(t))
}

/// Smith masking-shadowing for GGX, isotropic.
#[inline]
fn smith_g_ggx(n_dot_v: f32, alpha_g: f32) -> f32 {
    let a = alpha_g * alpha_g;
    let b = n_dot_v * n_dot_v;
    1.0 / (n_dot_v + (a + b - a * b).sqrt())
}

/// Smith masking-shadowing for GGX, anisotropic.
#[inline]
fn smith_g_ggx_aniso(n_dot_v: f32, v_dot_x: f32, v_dot_y: f32, ax: f32, ay: f32) -> f32 {
    1.0 / (n_dot_v + (square(v_dot_x * ax) + square(v_dot_y * ay) + square(n_dot_v)).sqrt())
}
