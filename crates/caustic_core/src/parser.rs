//! Scene file parser.
//!
//! The format is line oriented: every line is a keyword followed by
//! whitespace-separated values. Primitive blocks start with
//! `NEW_PRIMITIVE`; the shape and modifier keywords that follow apply to
//! the most recent primitive.
//!
//! # Supported Keywords
//!
//! - `DIMENSIONS w h`, `BG_COLOR r g b`, `RAY_DEPTH n`, `SAMPLES n`,
//!   `AMBIENT_LIGHT r g b`
//! - `CAMERA_POSITION|CAMERA_RIGHT|CAMERA_UP|CAMERA_FORWARD x y z`,
//!   `CAMERA_FOV_X radians`
//! - `NEW_PRIMITIVE`
//! - `PLANE nx ny nz`, `ELLIPSOID rx ry rz`, `BOX sx sy sz`,
//!   `TRIANGLE x1 y1 z1 x2 y2 z2 x3 y3 z3`
//! - `POSITION x y z`, `ROTATION x y z w`, `COLOR r g b`,
//!   `EMISSION r g b`, `METALLIC`, `DIELECTRIC`, `IOR value`
//!
//! Missing numbers read as zero. Unknown keywords are skipped.

use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use caustic_math::{Quat, Vec3};
use thiserror::Error;

use crate::object::{MaterialKind, Object};
use crate::scene::SceneDescription;
use crate::shape::Shape;

/// Parse error types.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid number at line {line}: {token:?}")]
    InvalidNumber { line: usize, token: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Cursor over the value tokens of one line.
struct Args<'a> {
    tokens: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Args<'a> {
    /// Next number, or zero if the line has run out of tokens.
    fn number<T: FromStr + Default>(&mut self) -> ParseResult<T> {
        match self.tokens.next() {
            None => Ok(T::default()),
            Some(token) => token.parse().map_err(|_| ParseError::InvalidNumber {
                line: self.line,
                token: token.to_string(),
            }),
        }
    }

    fn vec3(&mut self) -> ParseResult<Vec3> {
        Ok(Vec3::new(self.number()?, self.number()?, self.number()?))
    }
}

/// Parse a scene from its text.
pub fn parse_scene(content: &str) -> ParseResult<SceneDescription> {
    let mut scene = SceneDescription::default();

    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.split('#').next().unwrap_or_default();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let mut args = Args {
            tokens,
            line: line_number,
        };

        match keyword {
            "DIMENSIONS" => {
                scene.width = args.number()?;
                scene.height = args.number()?;
            }
            "BG_COLOR" => scene.background = args.vec3()?,
            "AMBIENT_LIGHT" => scene.ambient_light = args.vec3()?,
            "RAY_DEPTH" => scene.ray_depth = args.number()?,
            "SAMPLES" => scene.samples = args.number()?,
            "CAMERA_POSITION" => scene.camera.position = args.vec3()?,
            "CAMERA_RIGHT" => scene.camera.right = args.vec3()?.normalize_or_zero(),
            "CAMERA_UP" => scene.camera.up = args.vec3()?.normalize_or_zero(),
            "CAMERA_FORWARD" => scene.camera.forward = args.vec3()?.normalize_or_zero(),
            "CAMERA_FOV_X" => scene.camera.fov_x = args.number()?,
            "NEW_PRIMITIVE" => scene.objects.push(Object::default()),
            _ => {
                let Some(object) = scene.objects.last_mut() else {
                    if is_primitive_keyword(keyword) {
                        log::warn!("Line {}: {} before any NEW_PRIMITIVE, ignored", line_number, keyword);
                    } else {
                        log::debug!("Line {}: skipping unknown keyword {}", line_number, keyword);
                    }
                    continue;
                };
                apply_primitive_keyword(object, keyword, &mut args)?;
            }
        }
    }

    log::debug!(
        "Parsed scene {}x{}: {} objects",
        scene.width,
        scene.height,
        scene.objects.len()
    );
    Ok(scene)
}

fn is_primitive_keyword(keyword: &str) -> bool {
    matches!(
        keyword,
        "PLANE"
            | "ELLIPSOID"
            | "BOX"
            | "TRIANGLE"
            | "POSITION"
            | "ROTATION"
            | "COLOR"
            | "EMISSION"
            | "METALLIC"
            | "DIELECTRIC"
            | "IOR"
    )
}

fn apply_primitive_keyword(object: &mut Object, keyword: &str, args: &mut Args<'_>) -> ParseResult<()> {
    match keyword {
        "PLANE" => object.shape = Shape::Plane { normal: args.vec3()? },
        "ELLIPSOID" => object.shape = Shape::Ellipsoid { radii: args.vec3()? },
        "BOX" => {
            object.shape = Shape::Box {
                half_extents: args.vec3()?,
            }
        }
        "TRIANGLE" => {
            object.shape = Shape::Triangle {
                a: args.vec3()?,
                b: args.vec3()?,
                c: args.vec3()?,
            }
        }
        "POSITION" => object.position = args.vec3()?,
        "ROTATION" => {
            let (x, y, z, w) = (args.number()?, args.number()?, args.number()?, args.number()?);
            object.rotation = Quat::from_xyzw(x, y, z, w);
        }
        "COLOR" => object.color = args.vec3()?,
        "EMISSION" => object.emission = args.vec3()?,
        "METALLIC" => object.material = MaterialKind::Metallic,
        "DIELECTRIC" => object.material = MaterialKind::Dielectric,
        "IOR" => object.ior = args.number()?,
        other => log::debug!("Line {}: skipping unknown keyword {}", args.line, other),
    }
    Ok(())
}

/// Load and parse a scene file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> ParseResult<SceneDescription> {
    let path = path.as_ref();
    log::info!("Loading scene: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_scene(&content)
}
