//! Direction sampling for diffuse bounces.
//!
//! A distribution draws directions from a surface point and reports the
//! solid-angle density of any direction. The generator is passed in by the
//! caller, so distributions themselves hold no random state.

use std::f32::consts::PI;

use caustic_core::{Object, Shape};
use caustic_math::{Ray, Vec3};
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

/// Probe offset used when evaluating light densities.
const PROBE_EPSILON: f32 = 1e-4;

/// Sampling interface shared by all distributions.
pub trait Distribution {
    /// Draw a unit direction leaving `point`.
    fn sample(&self, point: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Solid-angle density of `direction` at `point`.
    fn pdf(&self, point: Vec3, normal: Vec3, direction: Vec3) -> f32;
}

/// Uniform point on the unit sphere from three normal draws.
pub(crate) fn unit_sphere_point(rng: &mut dyn RngCore) -> Vec3 {
    let x: f32 = rng.sample(StandardNormal);
    let y: f32 = rng.sample(StandardNormal);
    let z: f32 = rng.sample(StandardNormal);
    Vec3::new(x, y, z).normalize_or_zero()
}

/// Cosine-weighted hemisphere around the surface normal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistribution;

impl Distribution for CosineDistribution {
    fn sample(&self, _point: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = (unit_sphere_point(rng) + normal).normalize_or_zero();
        // Sphere point opposite the normal
        if direction == Vec3::ZERO {
            normal
        } else {
            direction
        }
    }

    fn pdf(&self, _point: Vec3, normal: Vec3, direction: Vec3) -> f32 {
        (normal.dot(direction) / PI).max(0.0)
    }
}

/// Area-light sampling towards one emissive object.
#[derive(Debug, Clone, Copy)]
pub struct LightDistribution<'a> {
    object: &'a Object,
}

impl<'a> LightDistribution<'a> {
    pub fn new(object: &'a Object) -> Self {
        Self { object }
    }

    /// Random point on the surface, in local space.
    fn sample_local(&self, rng: &mut dyn RngCore) -> Option<Vec3> {
        match self.object.shape {
            Shape::Box { half_extents: s } => {
                // Face pairs weighted by area, then a side
                let w = s.x * s.y + s.x * s.z + s.y * s.z;
                let r = rng.gen::<f32>() * w;
                let sign = if rng.gen::<f32>() > 0.5 { -1.0 } else { 1.0 };

                let mut p = Vec3::new(
                    s.x * rng.gen_range(-1.0..1.0),
                    s.y * rng.gen_range(-1.0..1.0),
                    s.z * rng.gen_range(-1.0..1.0),
                );
                if r < s.x * s.y {
                    p.z = s.z * sign;
                } else if r < s.x * s.y + s.x * s.z {
                    p.y = s.y * sign;
                } else {
                    p.x = s.x * sign;
                }
                Some(p)
            }
            Shape::Ellipsoid { radii } => Some(unit_sphere_point(rng) * radii),
            Shape::Triangle { a, b, c } => {
                let r1 = rng.gen::<f32>().sqrt();
                let r2 = rng.gen::<f32>();
                Some(a * (1.0 - r1) + b * (r1 * (1.0 - r2)) + c * (r1 * r2))
            }
            Shape::Plane { .. } => None,
        }
    }

    /// Density per unit area of the sampler at a world-space surface point.
    fn area_pdf(&self, world_point: Vec3) -> f32 {
        match self.object.shape {
            Shape::Box { half_extents: s } => {
                1.0 / (8.0 * (s.x * s.y + s.x * s.z + s.y * s.z))
            }
            Shape::Ellipsoid { radii: r } => {
                // Stretching the unit sphere by the radii scales area
                // elements by this factor at the preimage u
                let u = self.object.transform().to_local_point(world_point) / r;
                let stretch = Vec3::new(u.x * r.y * r.z, r.x * u.y * r.z, r.x * r.y * u.z);
                1.0 / (4.0 * PI * stretch.length())
            }
            Shape::Triangle { a, b, c } => 1.0 / (0.5 * (b - a).cross(c - a).length()),
            Shape::Plane { .. } => 0.0,
        }
    }
}

impl Distribution for LightDistribution<'_> {
    fn sample(&self, point: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let Some(local) = self.sample_local(rng) else {
            return normal;
        };
        let target = self.object.transform().to_world_point(local);
        let direction = (target - point).normalize_or_zero();
        if direction == Vec3::ZERO {
            normal
        } else {
            direction
        }
    }

    /// Sums the entry and exit surface hits along `direction`, each converted
    /// from area to solid angle with `distance² / |cos|`.
    fn pdf(&self, point: Vec3, _normal: Vec3, direction: Vec3) -> f32 {
        let first_origin = point + direction * PROBE_EPSILON;
        let Some(first) = self.object.intersect(&Ray::from_unit(first_origin, direction)) else {
            return 0.0;
        };
        let first_distance = PROBE_EPSILON + first.t;
        let mut p = self.area_pdf(first_origin + direction * first.t)
            * solid_angle_factor(first_distance, direction, first.normal);

        let second_offset = first.t + 2.0 * PROBE_EPSILON;
        let second_origin = point + direction * second_offset;
        if let Some(second) = self.object.intersect(&Ray::from_unit(second_origin, direction)) {
            let second_distance = second_offset + second.t;
            p += self.area_pdf(second_origin + direction * second.t)
                * solid_angle_factor(second_distance, direction, second.normal);
        }
        p
    }
}

#[inline]
fn solid_angle_factor(distance: f32, direction: Vec3, normal: Vec3) -> f32 {
    distance * distance / direction.dot(normal).abs()
}
