//! Demo render driver.
//!
//! Owns everything the tracing core does not: the accumulation buffer,
//! parallel dispatch over pixels with rayon, gamma correction, and PNG
//! output via the image crate.

use lumo_tracer::{
    trace_path, Background, Camera, Color, Dielectric, Lambertian, Light, Material, Metal,
    Principled, Quad, Ray, Scene, SceneBuilder, Sphere, TraceConfig, Vec3,
};
use rayon::prelude::*;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;
const SAMPLES_PER_PIXEL: u32 = 64;

fn main() {
    env_logger::init();

    let start = std::time::Instant::now();
    let scene = build_scene();
    log::info!("scene built in {:?}", start.elapsed());

    let mut camera = Camera::new()
        .with_position(Vec3::new(0.0, 1.2, 3.0), Vec3::new(0.0, 0.3, -1.0), Vec3::Y)
        .with_lens(45.0, WIDTH as f32 / HEIGHT as f32)
        .with_aperture(0.05, 4.0);
    camera.initialize();

    let config = TraceConfig {
        max_depth: 16,
        background: Background::VerticalGradient {
            top: Color::new(0.4, 0.55, 0.8),
            bottom: Color::new(0.9, 0.9, 0.9),
        },
        ..Default::default()
    };

    log::info!("rendering {WIDTH}x{HEIGHT} @ {SAMPLES_PER_PIXEL} spp");
    let start = std::time::Instant::now();

    // Each (pixel, sample) pair gets its own seed; rows render in parallel
    let pixels: Vec<Color> = (0..HEIGHT)
        .into_par_iter()
        .flat_map_iter(|y| (0..WIDTH).map(move |x| (x, y)))
        .map(|(x, y)| render_pixel(x, y, &camera, &scene, &config))
        .collect();

    log::info!("rendered in {:?}", start.elapsed());

    let mut out = image::RgbImage::new(WIDTH, HEIGHT);
    for (i, color) in pixels.iter().enumerate() {
        let x = i as u32 % WIDTH;
        let y = i as u32 / WIDTH;
        // Image rows run top to bottom; t = 1 is the top of the frame
        out.put_pixel(x, HEIGHT - 1 - y, image::Rgb(to_rgb8(*color)));
    }
    out.save("render_demo.png").expect("failed to save image");
    log::info!("saved render_demo.png");
}

fn render_pixel(x: u32, y: u32, camera: &Camera, scene: &Scene, config: &TraceConfig) -> Color {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    let mut total = Color::ZERO;
    for sample in 0..SAMPLES_PER_PIXEL {
        let seed = (u64::from(y) * u64::from(WIDTH) + u64::from(x)) * u64::from(SAMPLES_PER_PIXEL)
            + u64::from(sample);
        let mut jitter = SmallRng::seed_from_u64(seed);

        let s = (x as f32 + jitter.gen::<f32>()) / WIDTH as f32;
        let t = (y as f32 + jitter.gen::<f32>()) / HEIGHT as f32;
        let ray: Ray = camera.generate_ray(s, t, &mut jitter);

        total += trace_path(ray, scene, config, seed);
    }
    total / SAMPLES_PER_PIXEL as f32
}

fn build_scene() -> Scene {
    let mut builder = SceneBuilder::new();

    // Floor
    let floor = builder.add_material(Material::Lambertian(Lambertian::new(Color::new(
        0.55, 0.55, 0.5,
    ))));
    builder.add_object(
        Quad::new(
            Vec3::new(-6.0, -0.5, 2.0),
            Vec3::new(12.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -12.0),
        ),
        floor,
    );

    // Center: principled clearcoated red
    let red = builder.add_material(Material::Principled(Principled {
        base_color: Color::new(0.7, 0.1, 0.08),
        roughness: 0.35,
        clearcoat: 0.8,
        ..Default::default()
    }));
    builder.add_object(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5), red);

    // Left: hollow glass shell
    let glass = builder.add_material(Material::Dielectric(Dielectric::new(1.5)));
    builder.add_object(Sphere::new(Vec3::new(-1.1, 0.0, -1.0), 0.5), glass);
    builder.add_object(Sphere::new(Vec3::new(-1.1, 0.0, -1.0), -0.45), glass);

    // Right: brushed metal
    let brass = builder.add_material(Material::Metal(Metal::new(
        Color::new(0.8, 0.6, 0.2),
        0.15,
    )));
    builder.add_object(Sphere::new(Vec3::new(1.1, 0.0, -1.0), 0.5), brass);

    // Overhead quad light
    builder.add_light(Light::quad(
        Vec3::new(-1.5, 3.0, 0.5),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -3.0),
        Color::new(4.0, 4.0, 3.8),
    ));

    builder.build().expect("demo scene must validate")
}

fn to_rgb8(color: Color) -> [u8; 3] {
    [
        (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8,
        (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8,
        (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8,
    ]
}

/// Gamma correction (gamma = 2.0).
fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}
