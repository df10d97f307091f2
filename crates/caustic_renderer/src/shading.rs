//! Material response rules.
//!
//! Each rule decides how a path continues from a hit and how the radiance
//! arriving along the continuation is combined into the outgoing radiance.

use std::f32::consts::PI;

use caustic_core::{Intersection, MaterialKind, Object};
use caustic_math::{Ray, Vec3};
use rand::{Rng, RngCore};

use crate::distribution::Distribution;

/// Offset applied to every continuation ray.
pub const RAY_EPSILON: f32 = 1e-4;

/// Reflect a vector off a surface.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with relative index `eta`.
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_theta = (-uv).dot(n).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    if eta * sin_theta > 1.0 {
        return None;
    }
    let r_out_perp = eta * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    Some((r_out_perp + r_out_parallel).normalize_or_zero())
}

/// Schlick's approximation for Fresnel reflectance.
#[inline]
pub fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// How a path continues after a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Continuation {
    /// Trace `ray`; outgoing radiance is `emission + weight * incoming`.
    Trace {
        ray: Ray,
        weight: Vec3,
        emission: Vec3,
    },
    /// The path ends here with this radiance.
    Terminate(Vec3),
}

impl Continuation {
    /// Combine incoming radiance into the outgoing estimate.
    pub fn resolve(&self, incoming: impl FnOnce(&Ray) -> Vec3) -> Vec3 {
        match *self {
            Continuation::Trace {
                ray,
                weight,
                emission,
            } => emission + weight * incoming(&ray),
            Continuation::Terminate(radiance) => radiance,
        }
    }
}

/// Decide the continuation for `object` hit by `ray`.
pub fn scatter(
    ray: &Ray,
    hit: &Intersection,
    object: &Object,
    sampler: &dyn Distribution,
    rng: &mut dyn RngCore,
) -> Continuation {
    let point = ray.at(hit.t);
    let normal = hit.normal;

    match object.material {
        MaterialKind::Diffuse => {
            let direction = sampler.sample(point, normal, rng);
            let pdf = sampler.pdf(point, normal, direction);
            let cosine = normal.dot(direction);
            if !(pdf > 0.0) || !(cosine > 0.0) {
                return Continuation::Terminate(object.emission);
            }
            Continuation::Trace {
                ray: Ray::from_unit(point, direction).nudged(RAY_EPSILON),
                weight: object.color / PI * (cosine / pdf),
                emission: object.emission,
            }
        }
        MaterialKind::Metallic => Continuation::Trace {
            ray: Ray::new(point, reflect(ray.direction, normal)).nudged(RAY_EPSILON),
            weight: object.color,
            emission: object.emission,
        },
        MaterialKind::Dielectric => {
            let ratio = if hit.is_inside {
                object.ior
            } else {
                1.0 / object.ior
            };
            let cos_theta = (-ray.direction).dot(normal).min(1.0);
            let reflectance = schlick(cos_theta, ratio);

            let refracted = if rng.gen::<f32>() < reflectance {
                None
            } else {
                refract(ray.direction, normal, ratio)
            };

            match refracted {
                Some(direction) => Continuation::Trace {
                    ray: Ray::new(point, direction).nudged(RAY_EPSILON),
                    weight: if hit.is_inside { Vec3::ONE } else { object.color },
                    emission: Vec3::ZERO,
                },
                // Fresnel reflection or total internal reflection
                None => Continuation::Trace {
                    ray: Ray::new(point, reflect(ray.direction, normal)).nudged(RAY_EPSILON),
                    weight: Vec3::ONE,
                    emission: if hit.is_inside {
                        Vec3::ZERO
                    } else {
                        object.emission
                    },
                },
            }
        }
    }
}
