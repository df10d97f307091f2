//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Light importance sampling mixed with cosine sampling
//! - Anti-aliasing via jittered multi-sampling
//! - ACES tone mapping and gamma correction

use std::time::Instant;

use caustic_core::SceneDescription;
use caustic_math::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, DEFAULT_BUCKET_SIZE};
use crate::image::ImageBuffer;
use crate::scene::Scene;

/// Default base seed for the per-pixel generators.
pub const DEFAULT_SEED: u64 = 239;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance of rays that miss everything
    pub background: Vec3,
    /// Base seed; each pixel offsets it by its row-major index
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            max_depth: 6,
            background: Vec3::ZERO,
            seed: DEFAULT_SEED,
        }
    }
}

impl RenderConfig {
    /// Take sample count, depth and background from a scene file.
    pub fn from_description(desc: &SceneDescription) -> Self {
        let samples_per_pixel = if desc.samples == 0 {
            log::warn!("Scene sets no SAMPLES, using 1 sample per pixel");
            1
        } else {
            desc.samples
        };
        Self {
            samples_per_pixel,
            max_depth: desc.ray_depth,
            background: desc.background,
            ..Default::default()
        }
    }

    pub fn with_samples(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_background(mut self, background: Vec3) -> Self {
        self.background = background;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// ACES filmic tone curve, clamped to [0, 1].
#[inline]
pub fn aces_tone_map(x: f32) -> f32 {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(0.0, 1.0)
}

/// Apply gamma correction (gamma = 2.2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

/// Convert a radiance value to 8-bit RGB.
pub fn color_to_rgb8(color: Vec3) -> [u8; 3] {
    let channel = |c: f32| (linear_to_gamma(aces_tone_map(c)) * 255.0).clamp(0.0, 255.0).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(scene: &Scene, x: u32, y: u32, config: &RenderConfig) -> Vec3 {
    if config.samples_per_pixel == 0 {
        return Vec3::ZERO;
    }
    let pixel_index = y as u64 * scene.camera.image_width as u64 + x as u64;
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(pixel_index));

    let mut pixel_color = Vec3::ZERO;
    for _ in 0..config.samples_per_pixel {
        let ray = scene.camera.get_ray(x, y, &mut rng);
        pixel_color += scene.trace(&ray, 0, config, &mut rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Render the entire scene to an image buffer.
pub fn render(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let (width, height) = (scene.camera.image_width, scene.camera.image_height);
    let start = Instant::now();

    let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);
    let rendered: Vec<_> = buckets
        .par_iter()
        .map(|bucket| (*bucket, render_bucket(bucket, scene, config)))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for (bucket, pixels) in &rendered {
        bucket.write_into(&mut image, pixels);
    }

    log::info!(
        "Rendered {}x{} at {} spp in {} buckets ({:.2?})",
        width,
        height,
        config.samples_per_pixel,
        buckets.len(),
        start.elapsed()
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use caustic_core::{parse_scene, Object, Shape};
    use caustic_math::Ray;

    #[test]
    fn test_aces_tone_map() {
        assert_eq!(aces_tone_map(0.0), 0.0);
        assert_eq!(aces_tone_map(1000.0), 1.0);
        assert!((aces_tone_map(1.0) - 0.8038).abs() < 1e-3);
        // Monotonic over the display range
        assert!(aces_tone_map(0.2) < aces_tone_map(0.5));
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.5) - 0.7297).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Vec3::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Vec3::splat(50.0)), [255, 255, 255]);
        // 0.5 -> aces 0.6163 -> gamma 0.8025 -> 204.6
        assert_eq!(color_to_rgb8(Vec3::splat(0.5)), [205, 205, 205]);
    }

    #[test]
    fn test_config_from_description() {
        let desc = parse_scene("RAY_DEPTH 3\nSAMPLES 8\nBG_COLOR 1 0 0\n").unwrap();
        let config = RenderConfig::from_description(&desc);

        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.background, Vec3::X);
        assert_eq!(config.seed, DEFAULT_SEED);

        let no_samples = RenderConfig::from_description(&SceneDescription::default());
        assert_eq!(no_samples.samples_per_pixel, 1);
    }

    /// Closed diffuse room with a small light box under the ceiling.
    fn lit_room(light_emission: Vec3) -> SceneDescription {
        SceneDescription {
            width: 8,
            height: 8,
            background: Vec3::splat(10.0),
            objects: vec![
                Object::new(Shape::Box {
                    half_extents: Vec3::splat(5.0),
                })
                .with_color(Vec3::splat(0.8)),
                Object::new(Shape::Box {
                    half_extents: Vec3::new(1.0, 0.2, 1.0),
                })
                .with_position(Vec3::new(0.0, 4.5, 0.0))
                .with_color(Vec3::ONE)
                .with_emission(light_emission),
            ],
            ..Default::default()
        }
    }

    fn radiance_at_floor(desc: &SceneDescription, max_depth: u32) -> Vec3 {
        let scene = Scene::from_description(desc).unwrap();
        let config = RenderConfig::default()
            .with_max_depth(max_depth)
            .with_background(desc.background);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 1.0), -Vec3::Y);

        let samples = 64;
        (0..samples)
            .map(|_| scene.trace(&ray, 0, &config, &mut rng))
            .sum::<Vec3>()
            / samples as f32
    }

    #[test]
    fn test_lit_room_has_positive_radiance() {
        let radiance = radiance_at_floor(&lit_room(Vec3::splat(10.0)), 1);
        assert!(radiance.min_element() > 0.0, "{:?}", radiance);
    }

    #[test]
    fn test_dark_room_has_zero_radiance() {
        // Closed room: the bright background never leaks in
        let radiance = radiance_at_floor(&lit_room(Vec3::ZERO), 1);
        assert_eq!(radiance, Vec3::ZERO);
    }

    #[test]
    fn test_enclosed_light_contributes_nothing() {
        // The light stays in the light BVH, so light sampling still aims at
        // it, but every such ray stops on the shell around it
        let mut desc = lit_room(Vec3::splat(10.0));
        desc.objects.push(
            Object::new(Shape::Box {
                half_extents: Vec3::new(1.5, 0.5, 1.5),
            })
            .with_position(Vec3::new(0.0, 4.4, 0.0))
            .with_color(Vec3::splat(0.8)),
        );
        let scene = Scene::from_description(&desc).unwrap();
        assert_eq!(scene.sampler().lights().len(), 1);

        for max_depth in [1, 3] {
            let radiance = radiance_at_floor(&desc, max_depth);
            assert_eq!(radiance, Vec3::ZERO, "depth {max_depth}");
        }
    }

    const SPHERE_SCENE: &str = "\
BG_COLOR 0.2 0.2 0.2
CAMERA_POSITION 0 0 5
CAMERA_RIGHT 1 0 0
CAMERA_UP 0 1 0
CAMERA_FORWARD 0 0 -1
SAMPLES 1
RAY_DEPTH 1
NEW_PRIMITIVE
ELLIPSOID 1 1 1
COLOR 1 0 0
";

    fn render_sphere(dimensions: &str, fov_x: f32) -> (ImageBuffer, RenderConfig) {
        let text = format!("{SPHERE_SCENE}DIMENSIONS {dimensions}\nCAMERA_FOV_X {fov_x}\n");
        let desc = parse_scene(&text).unwrap();
        let scene = Scene::from_description(&desc).unwrap();
        let config = RenderConfig::from_description(&desc);
        (render(&scene, &config), config)
    }

    #[test]
    fn test_sphere_fills_narrow_view() {
        // Every 2x2 pixel is inside the sphere's silhouette
        let fov_x = 2.0 * 0.1f32.atan();
        let (image, config) = render_sphere("2 2", fov_x);
        let background = color_to_rgb8(config.background);

        for pixel in image.to_rgb8().chunks(3) {
            assert_ne!(pixel, background);
            // Red albedo times a grey sky
            assert_eq!(pixel[1], 0);
            assert!(pixel[0] > 0);
        }
    }

    #[test]
    fn test_sphere_corners_see_background() {
        let fov_x = 2.0 * 0.5f32.atan();
        let (image, config) = render_sphere("5 5", fov_x);
        let background = config.background;

        assert_ne!(image.get(2, 2), background);
        for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
            assert_eq!(image.get(x, y), background, "corner ({x}, {y})");
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut desc = lit_room(Vec3::splat(10.0));
        desc.camera = caustic_core::CameraDescription {
            position: Vec3::new(0.0, 0.0, 4.0),
            right: Vec3::X,
            up: Vec3::Y,
            forward: -Vec3::Z,
            fov_x: 1.2,
        };
        let scene = Scene::from_description(&desc).unwrap();
        let config = RenderConfig::default().with_samples(4).with_max_depth(3);

        let ppm = |config: &RenderConfig| {
            let mut bytes = Vec::new();
            render(&scene, config).write_ppm(&mut bytes).unwrap();
            bytes
        };
        let first = ppm(&config);
        assert_eq!(first, ppm(&config));
        assert_ne!(first, ppm(&config.clone().with_seed(1)));
    }
}
