//! Camera for ray generation.

use crate::sampling::random_in_unit_disk;
use lumo_math::{Ray, Vec3};
use rand::RngCore;

/// Look-at camera with optional thin-lens depth of field.
///
/// Maps normalized image-plane coordinates `(s, t)` in `[0, 1]^2` to world
/// rays. With a nonzero aperture the ray origin is jittered over a lens
/// disk while the target stays the unjittered focal-plane point, which is
/// what produces defocus blur.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32, // Vertical field of view in degrees
    aspect: f32,
    aperture: f32,
    focus_dist: f32,

    // Cached computed values (set by initialize())
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect: 16.0 / 9.0,
            aperture: 0.0,
            focus_dist: 1.0,
            origin: Vec3::ZERO,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            lens_radius: 0.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set field of view (degrees) and aspect ratio.
    pub fn with_lens(mut self, vfov: f32, aspect: f32) -> Self {
        self.vfov = vfov;
        self.aspect = aspect;
        self
    }

    /// Set depth of field: aperture diameter and focus distance.
    pub fn with_aperture(mut self, aperture: f32, focus_dist: f32) -> Self {
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = self.aspect * half_height;

        // Orthonormal basis: w looks backward, u right, v up
        let w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(w).normalize();
        self.v = w.cross(self.u);

        self.origin = self.look_from;
        self.lower_left = self.origin
            - self.focus_dist * (half_width * self.u + half_height * self.v + w);
        self.horizontal = 2.0 * half_width * self.focus_dist * self.u;
        self.vertical = 2.0 * half_height * self.focus_dist * self.v;
        self.lens_radius = self.aperture / 2.0;
    }

    /// Generate a ray through normalized image-plane coordinates (s, t).
    ///
    /// `(0, 0)` is the lower-left corner, `(1, 1)` the upper-right. With
    /// `aperture = 0` no randomness is consumed and the camera is an
    /// exact pinhole.
    pub fn generate_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        Ray::new(
            self.origin + offset,
            self.lower_left + s * self.horizontal + t * self.vertical - self.origin - offset,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_camera(aperture: f32) -> Camera {
        let mut camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 1.0)
            .with_aperture(aperture, 1.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = test_camera(0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.generate_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!((ray.direction.normalize() - -Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_corner_rays_span_fov() {
        // 90 degree vertical FOV at aspect 1: the image plane corners sit
        // at 45 degrees off axis in both directions
        let camera = test_camera(0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.generate_ray(0.0, 0.0, &mut rng);
        let d = ray.direction.normalize();
        assert!(d.x < 0.0);
        assert!(d.y < 0.0);

        let ray = camera.generate_ray(1.0, 1.0, &mut rng);
        let d = ray.direction.normalize();
        assert!(d.x > 0.0);
        assert!(d.y > 0.0);
    }

    #[test]
    fn test_pinhole_ignores_lens_samples() {
        // aperture = 0: rays for a given (s, t) are identical no matter
        // what the rng would have produced
        let camera = test_camera(0.0);
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(999);

        let ray_a = camera.generate_ray(0.3, 0.7, &mut rng_a);
        let ray_b = camera.generate_ray(0.3, 0.7, &mut rng_b);
        assert_eq!(ray_a.origin, ray_b.origin);
        assert_eq!(ray_a.direction, ray_b.direction);
    }

    #[test]
    fn test_lens_jitter_keeps_focal_point() {
        // With depth of field the origins differ per lens sample but every
        // ray still passes through the same focal-plane point
        let camera = test_camera(0.5);
        let mut rng = StdRng::seed_from_u64(42);

        let (s, t) = (0.25, 0.6);
        let reference = {
            let pinhole = test_camera(0.0);
            let focal_ray = pinhole.generate_ray(s, t, &mut rng);
            focal_ray.at(1.0) // focus_dist scaled into the plane spans
        };

        let mut saw_offset_origin = false;
        for _ in 0..20 {
            let ray = camera.generate_ray(s, t, &mut rng);
            if ray.origin != Vec3::ZERO {
                saw_offset_origin = true;
            }
            // The focal point lies on the ray: direction is exactly
            // (focal_point - origin)
            let to_focal = reference - ray.origin;
            assert!(to_focal.cross(ray.direction).length() < 1e-4);
        }
        assert!(saw_offset_origin);
    }
}
