//! Caustic Core - Scene data model and scene file loading.
//!
//! This crate provides:
//!
//! - **Geometry**: `Shape` with local-space ray solvers, `Object` placement
//!   and world-space bounds
//! - **Scene files**: `SceneDescription` and the text format parser
//!
//! # Example
//!
//! ```ignore
//! use caustic_core::load_scene;
//!
//! let scene = load_scene("scene.txt")?;
//! println!("{}x{} with {} objects", scene.width, scene.height, scene.objects.len());
//! ```

pub mod object;
pub mod parser;
pub mod scene;
pub mod shape;

// Re-export commonly used types
pub use object::{GeometryError, MaterialKind, Object};
pub use parser::{load_scene, parse_scene, ParseError};
pub use scene::{CameraDescription, SceneDescription};
pub use shape::{Intersection, Shape};
