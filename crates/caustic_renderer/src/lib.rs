//! Caustic Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over a small closed set of primitives, with a
//! cost-driven BVH and light importance sampling.
//!
//! # Example
//!
//! ```ignore
//! use caustic_core::load_scene;
//! use caustic_renderer::{render, RenderConfig, Scene};
//!
//! let desc = load_scene("scene.txt")?;
//! let scene = Scene::from_description(&desc)?;
//! let image = render(&scene, &RenderConfig::from_description(&desc));
//! image.save_ppm("out.ppm")?;
//! ```

mod bucket;
mod bvh;
mod camera;
mod distribution;
mod image;
mod mix;
mod renderer;
mod scene;
pub mod shading;

pub use bucket::{generate_buckets, render_bucket, Bucket, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode, Hit, NodeKind};
pub use camera::Camera;
pub use distribution::{CosineDistribution, Distribution, LightDistribution};
pub use image::ImageBuffer;
pub use mix::MixDistribution;
pub use renderer::{
    aces_tone_map, color_to_rgb8, linear_to_gamma, render, render_pixel, RenderConfig, DEFAULT_SEED,
};
pub use scene::{RenderError, Scene};

/// Re-export Vec3 and common math types from caustic_math
pub use caustic_math::{Aabb, Ray, Vec3};
