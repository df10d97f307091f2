//! Tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Every pixel seeds its own generator, so
//! the tile layout and the order in which tiles finish do not affect the
//! result.

use caustic_math::Vec3;

use crate::image::ImageBuffer;
use crate::renderer::{render_pixel, RenderConfig};
use crate::scene::Scene;

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Copy rendered pixels (row-major within the bucket) into `image`.
    pub fn write_into(&self, image: &mut ImageBuffer, pixels: &[Vec3]) {
        let coords = (0..self.height).flat_map(|dy| (0..self.width).map(move |dx| (dx, dy)));
        for ((dx, dy), color) in coords.zip(pixels) {
            image.set(self.x + dx, self.y + dy, *color);
        }
    }
}

/// Cover a `width` x `height` image with buckets, row by row.
///
/// Buckets on the right and bottom edges are clipped to the image.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            buckets.push(Bucket::new(x, y, size.min(width - x), size.min(height - y)));
            x += size;
        }
        y += size;
    }

    buckets
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, scene: &Scene, config: &RenderConfig) -> Vec<Vec3> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(scene, bucket.x + local_x, bucket.y + local_y, config);
            pixels.push(color);
        }
    }

    pixels
}
