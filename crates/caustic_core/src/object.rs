//! Scene objects: a shape placed in the world with a material.

use caustic_math::{Aabb, Quat, Ray, RigidTransform, Vec3};
use thiserror::Error;

use crate::shape::{Intersection, Shape};

/// Geometry contract violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Planes have no finite bounds and must be kept out of any BVH.
    #[error("plane primitive has no bounding box")]
    Unbounded,
}

/// Surface response used by the integrator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Metallic,
    Dielectric,
}

/// A shape with placement and surface properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub shape: Shape,
    pub position: Vec3,
    /// Unit quaternion, local to world
    pub rotation: Quat,
    /// Albedo
    pub color: Vec3,
    /// Emitted radiance
    pub emission: Vec3,
    pub material: MaterialKind,
    /// Index of refraction, used by dielectrics only
    pub ior: f32,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            color: Vec3::ZERO,
            emission: Vec3::ZERO,
            material: MaterialKind::Diffuse,
            ior: 1.0,
        }
    }
}

impl Object {
    /// Create a diffuse object at the origin.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_emission(mut self, emission: Vec3) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: MaterialKind) -> Self {
        self.material = material;
        self
    }

    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }

    /// Object-to-world transform.
    pub fn transform(&self) -> RigidTransform {
        RigidTransform::new(self.position, self.rotation)
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.cmpgt(Vec3::ZERO).any()
    }

    pub fn is_bounded(&self) -> bool {
        !self.shape.is_plane()
    }

    /// Intersect a world-space ray.
    ///
    /// The ray is moved into the local frame, solved there, and the normal
    /// is rotated back. The transform is rigid, so `t` carries over as is.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let transform = self.transform();
        let local = transform.to_local_ray(ray);
        let mut hit = self.shape.intersect_local(&local)?;
        hit.normal = transform.to_world_vector(hit.normal).normalize_or_zero();
        Some(hit)
    }

    /// World-space bounding box.
    pub fn aabb(&self) -> Result<Aabb, GeometryError> {
        let corners = self.shape.local_corners().ok_or(GeometryError::Unbounded)?;
        Ok(self.transform().transform_points_aabb(corners))
    }
}
