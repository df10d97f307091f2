// Re-export glam for convenience
pub use glam::*;

// caustic math types
mod aabb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use ray::Ray;
pub use transform::RigidTransform;
