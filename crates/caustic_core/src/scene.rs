//! In-memory scene description, as read from a scene file.

use caustic_math::Vec3;

use crate::object::Object;

/// Pinhole camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraDescription {
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    /// Horizontal field of view in radians
    pub fov_x: f32,
}

/// Everything a scene file declares.
///
/// Fields a file does not mention stay at zero or empty; no range checks
/// are applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDescription {
    pub width: u32,
    pub height: u32,
    pub background: Vec3,
    pub camera: CameraDescription,
    pub ray_depth: u32,
    pub samples: u32,
    /// Parsed for completeness; background radiance covers ambient light
    pub ambient_light: Vec3,
    pub objects: Vec<Object>,
}

impl SceneDescription {
    /// Number of objects that are planes.
    pub fn plane_count(&self) -> usize {
        self.objects.iter().filter(|o| !o.is_bounded()).count()
    }

    /// Number of bounded emissive objects.
    pub fn light_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.is_bounded() && o.is_emissive())
            .count()
    }
}
