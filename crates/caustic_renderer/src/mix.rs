//! Mixture of cosine and light sampling.

use caustic_core::Object;
use caustic_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::bvh::Bvh;
use crate::distribution::{CosineDistribution, Distribution, LightDistribution};

/// Base seed for the per-pick light generators.
const LIGHT_SEED_BASE: u64 = 44;
/// Upper bound (inclusive) of the random offset added to the light seed.
const LIGHT_SEED_SPREAD: u64 = 100_000;

/// Half cosine sampling, half sampling towards a uniformly chosen light.
#[derive(Debug, Clone, Default)]
pub struct MixDistribution {
    cosine: CosineDistribution,
    lights: Bvh,
}

impl MixDistribution {
    pub fn new(lights: Bvh) -> Self {
        Self {
            cosine: CosineDistribution,
            lights,
        }
    }

    pub fn lights(&self) -> &Bvh {
        &self.lights
    }

    fn light(&self, index: usize) -> &Object {
        &self.lights.objects()[index]
    }
}

impl Distribution for MixDistribution {
    fn sample(&self, point: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let use_light = rng.gen_bool(0.5);
        if !use_light || self.lights.is_empty() {
            return self.cosine.sample(point, normal, rng);
        }

        let index = rng.gen_range(0..self.lights.len());
        let offset = rng.gen_range(0..=LIGHT_SEED_SPREAD);
        let mut light_rng = StdRng::seed_from_u64(LIGHT_SEED_BASE + index as u64 + offset);
        LightDistribution::new(self.light(index)).sample(point, normal, &mut light_rng)
    }

    fn pdf(&self, point: Vec3, normal: Vec3, direction: Vec3) -> f32 {
        let cosine = self.cosine.pdf(point, normal, direction);
        if self.lights.is_empty() {
            return cosine;
        }
        let light_count = self.lights.len() as f32;
        0.5 * cosine + 0.5 / light_count * self.lights.pdf(point, normal, direction)
    }
}
