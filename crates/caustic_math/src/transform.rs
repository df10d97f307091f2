use crate::{Aabb, Quat, Ray, Vec3};

/// Translation + rotation, applied as `rotation * p + translation`.
///
/// There is no scale, so distances along a ray are the same in local and
/// world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RigidTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl RigidTransform {
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn to_world_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    #[inline]
    pub fn to_world_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    #[inline]
    pub fn to_local_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.translation)
    }

    #[inline]
    pub fn to_local_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse() * vector
    }

    /// Express a world-space ray in the local frame.
    pub fn to_local_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.to_local_point(ray.origin),
            self.to_local_vector(ray.direction),
        )
    }

    /// Bounding box of local points after the forward transform.
    pub fn transform_points_aabb<I: IntoIterator<Item = Vec3>>(&self, points: I) -> Aabb {
        Aabb::from_points(points.into_iter().map(|p| self.to_world_point(p)))
    }
}
