//! Render-ready scene built from a parsed description.

use caustic_core::{GeometryError, Intersection, Object, SceneDescription};
use caustic_math::{Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

use crate::bvh::{nearest_in, Bvh};
use crate::camera::Camera;
use crate::mix::MixDistribution;
use crate::renderer::RenderConfig;
use crate::shading::scatter;

/// Errors raised while preparing or writing a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid scene geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Geometry, lights and camera, ready for tracing.
///
/// Planes are unbounded and kept in a plain list; everything else lives in
/// the geometry BVH. Bounded emissive objects are also copied into the
/// light BVH used for importance sampling.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    planes: Vec<Object>,
    geometry: Bvh,
    sampler: MixDistribution,
}

impl Scene {
    pub fn from_description(desc: &SceneDescription) -> Result<Self, RenderError> {
        let (planes, bounded): (Vec<Object>, Vec<Object>) =
            desc.objects.iter().cloned().partition(|o| !o.is_bounded());
        let lights: Vec<Object> = bounded.iter().filter(|o| o.is_emissive()).cloned().collect();

        log::debug!(
            "Scene: {} bounded objects, {} planes, {} lights",
            bounded.len(),
            planes.len(),
            lights.len()
        );

        Ok(Self {
            camera: Camera::new(&desc.camera, desc.width, desc.height),
            planes,
            geometry: Bvh::build(bounded)?,
            sampler: MixDistribution::new(Bvh::build(lights)?),
        })
    }

    pub fn geometry(&self) -> &Bvh {
        &self.geometry
    }

    pub fn planes(&self) -> &[Object] {
        &self.planes
    }

    pub fn sampler(&self) -> &MixDistribution {
        &self.sampler
    }

    /// Nearest hit over the BVH and all planes.
    pub fn intersect(&self, ray: &Ray) -> Option<(Intersection, &Object)> {
        let bvh_hit = self
            .geometry
            .intersect(ray)
            .map(|hit| (hit.intersection, &self.geometry.objects()[hit.object]));
        let plane_hit = nearest_in(&self.planes, 0, ray)
            .map(|hit| (hit.intersection, &self.planes[hit.object]));

        match (bvh_hit, plane_hit) {
            (Some(a), Some(b)) => Some(if b.0.t < a.0.t { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Radiance arriving along `ray`.
    ///
    /// Camera rays start at depth 0; paths deeper than `config.max_depth`
    /// carry no radiance.
    pub fn trace(&self, ray: &Ray, depth: u32, config: &RenderConfig, rng: &mut dyn RngCore) -> Vec3 {
        if depth > config.max_depth {
            return Vec3::ZERO;
        }

        let Some((hit, object)) = self.intersect(ray) else {
            return config.background;
        };

        scatter(ray, &hit, object, &self.sampler, rng)
            .resolve(|next| self.trace(next, depth + 1, config, rng))
    }
}
