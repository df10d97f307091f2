//! Pinhole camera for ray generation.

use caustic_core::CameraDescription;
use caustic_math::{Ray, Vec3};
use rand::{Rng, RngCore};

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    position: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,

    // Half-extents of the image plane at unit distance
    tan_x: f32,
    tan_y: f32,
}

impl Camera {
    /// Create a camera for an image of the given size.
    ///
    /// The vertical extent follows from the horizontal field of view and
    /// the aspect ratio.
    pub fn new(desc: &CameraDescription, image_width: u32, image_height: u32) -> Self {
        let aspect_ratio = image_width as f32 / image_height as f32;
        let tan_x = (desc.fov_x / 2.0).tan();
        Self {
            image_width,
            image_height,
            position: desc.position,
            right: desc.right,
            up: desc.up,
            forward: desc.forward,
            tan_x,
            tan_y: tan_x / aspect_ratio,
        }
    }

    /// Ray through the continuous image coordinate `(x, y)`, in pixels from
    /// the top-left corner.
    pub fn ray_through(&self, x: f32, y: f32) -> Ray {
        let ndc_x = (2.0 * x / self.image_width as f32 - 1.0) * self.tan_x;
        let ndc_y = -(2.0 * y / self.image_height as f32 - 1.0) * self.tan_y;
        let direction = ndc_x * self.right + ndc_y * self.up + self.forward;
        Ray::new(self.position, direction)
    }

    /// Ray through a uniformly jittered point inside pixel `(x, y)`.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let u: f32 = rng.gen();
        let v: f32 = rng.gen();
        self.ray_through(x as f32 + u, y as f32 + v)
    }
}
