//! Primitive shapes and their local-space ray solvers.
//!
//! Every solver receives a ray already expressed in the shape's own frame
//! (centered at the origin, unrotated) with a unit direction. Degenerate
//! inputs such as a ray parallel to a plane or a zero-size box produce
//! IEEE infinities or NaNs along the way; every comparison is written so
//! that those resolve to `None`.

use caustic_math::{Aabb, Ray, Vec3};

/// Result of a ray hitting a surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intersection {
    /// Distance along the ray, always non-negative
    pub t: f32,
    /// Unit normal facing the incoming ray
    pub normal: Vec3,
    /// True when the ray started inside the surface
    pub is_inside: bool,
}

impl Intersection {
    /// Orient `outward` against `direction`, flagging back-face hits.
    fn facing(t: f32, outward: Vec3, direction: Vec3) -> Self {
        let is_inside = outward.dot(direction) > 0.0;
        Self {
            t,
            normal: if is_inside { -outward } else { outward },
            is_inside,
        }
    }
}

/// Closed set of primitive shapes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    /// Infinite plane through the origin with the given normal.
    Plane { normal: Vec3 },
    /// Axis-aligned ellipsoid with per-axis radii.
    Ellipsoid { radii: Vec3 },
    /// Axis-aligned box spanning `-half_extents..half_extents`.
    Box { half_extents: Vec3 },
    /// Single triangle given by its three vertices.
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
}

impl Default for Shape {
    /// A plane with a zero normal, which no ray ever hits.
    fn default() -> Self {
        Shape::Plane { normal: Vec3::ZERO }
    }
}

/// Accept a solver distance only if it is finite and not behind the origin.
#[inline]
fn valid_t(t: f32) -> bool {
    t.is_finite() && t >= 0.0
}

impl Shape {
    pub fn is_plane(&self) -> bool {
        matches!(self, Shape::Plane { .. })
    }

    /// Intersect a local-space ray with this shape.
    pub fn intersect_local(&self, ray: &Ray) -> Option<Intersection> {
        match *self {
            Shape::Plane { normal } => intersect_plane(ray, normal),
            Shape::Ellipsoid { radii } => intersect_ellipsoid(ray, radii),
            Shape::Box { half_extents } => intersect_box(ray, half_extents),
            Shape::Triangle { a, b, c } => intersect_triangle(ray, a, b, c),
        }
    }

    /// Points whose bounding box is the shape's local bounding box.
    ///
    /// Ellipsoids use the corners of their enclosing box. Planes are
    /// unbounded and return `None`.
    pub fn local_corners(&self) -> Option<Vec<Vec3>> {
        match *self {
            Shape::Plane { .. } => None,
            Shape::Ellipsoid { radii: extents } | Shape::Box { half_extents: extents } => {
                Some(Aabb::new(-extents, extents).corners().to_vec())
            }
            Shape::Triangle { a, b, c } => Some(vec![a, b, c]),
        }
    }
}

fn intersect_plane(ray: &Ray, normal: Vec3) -> Option<Intersection> {
    let t = -(ray.origin.dot(normal) / ray.direction.dot(normal));
    if !valid_t(t) {
        return None;
    }
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }
    Some(Intersection::facing(t, normal, ray.direction))
}

fn intersect_ellipsoid(ray: &Ray, radii: Vec3) -> Option<Intersection> {
    // Scale space so the ellipsoid becomes the unit sphere
    let o = ray.origin / radii;
    let d = ray.direction / radii;

    let a = d.dot(d);
    let b = o.dot(d);
    let c = o.dot(o) - 1.0;

    let discriminant = b * b - a * c;
    if !(discriminant >= 0.0) {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = (-b - sqrt_d) / a;
    let far = (-b + sqrt_d) / a;

    let t = if valid_t(near) {
        near
    } else if valid_t(far) {
        far
    } else {
        return None;
    };

    // Gradient of the implicit surface p.x²/r.x² + ...
    let p = ray.at(t);
    let outward = (p / (radii * radii)).normalize_or_zero();
    Some(Intersection::facing(t, outward, ray.direction))
}

fn intersect_box(ray: &Ray, half_extents: Vec3) -> Option<Intersection> {
    let ta = (-half_extents - ray.origin) / ray.direction;
    let tb = (half_extents - ray.origin) / ray.direction;

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let (lo, hi) = if ta[axis] > tb[axis] {
            (tb[axis], ta[axis])
        } else {
            (ta[axis], tb[axis])
        };
        // f32::max/min skip NaN, so an axis with 0/0 does not constrain the interval
        t_enter = t_enter.max(lo);
        t_exit = t_exit.min(hi);
    }

    if t_enter > t_exit || t_exit < 0.0 {
        return None;
    }
    let (t, is_inside) = if t_enter < 0.0 {
        (t_exit, true)
    } else {
        (t_enter, false)
    };
    if !t.is_finite() {
        return None;
    }

    // Face normal: axis on which the hit point is closest to the surface
    let q = ray.at(t) / half_extents;
    let mut axis = 0;
    for i in 1..3 {
        if q[i].abs() > q[axis].abs() {
            axis = i;
        }
    }
    let mut outward = Vec3::ZERO;
    outward[axis] = if q[axis] < 0.0 { -1.0 } else { 1.0 };

    Some(Intersection {
        t,
        normal: if is_inside { -outward } else { outward },
        is_inside,
    })
}

/// Möller-Trumbore, two-sided.
fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<Intersection> {
    const PARALLEL_EPSILON: f32 = 1e-8;

    let edge1 = b - a;
    let edge2 = c - a;
    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if !(det.abs() >= PARALLEL_EPSILON) {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if !valid_t(t) {
        return None;
    }

    let outward = edge1.cross(edge2).normalize_or_zero();
    Some(Intersection::facing(t, outward, ray.direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_plane_hit_from_front() {
        let plane = Shape::Plane { normal: Vec3::Y };
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.0, 0.0));

        let hit = plane.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 2.0));
        assert_eq!(hit.normal, Vec3::Y);
        assert!(!hit.is_inside);
    }

    #[test]
    fn test_plane_hit_from_back_flips_normal() {
        let plane = Shape::Plane { normal: Vec3::Y };
        let ray = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y);

        let hit = plane.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 3.0));
        assert_eq!(hit.normal, -Vec3::Y);
        assert!(hit.is_inside);
    }

    #[test]
    fn test_plane_parallel_and_behind_miss() {
        let plane = Shape::Plane { normal: Vec3::Y };

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(plane.intersect_local(&parallel).is_none());

        let in_plane = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(plane.intersect_local(&in_plane).is_none());

        let away = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(plane.intersect_local(&away).is_none());
    }

    #[test]
    fn test_default_shape_never_hits() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        assert!(Shape::default().intersect_local(&ray).is_none());
    }

    #[test]
    fn test_unit_sphere_from_outside() {
        let sphere = Shape::Ellipsoid { radii: Vec3::ONE };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let hit = sphere.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 4.0));
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert!(!hit.is_inside);
    }

    #[test]
    fn test_sphere_from_inside() {
        let sphere = Shape::Ellipsoid { radii: Vec3::splat(2.0) };
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 2.0));
        assert!((hit.normal + Vec3::X).length() < 1e-4);
        assert!(hit.is_inside);
    }

    #[test]
    fn test_ellipsoid_stretched_axis() {
        let ellipsoid = Shape::Ellipsoid {
            radii: Vec3::new(3.0, 1.0, 1.0),
        };
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), -Vec3::X);

        let hit = ellipsoid.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 7.0));
        assert!((hit.normal - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_ellipsoid_miss_and_behind() {
        let sphere = Shape::Ellipsoid { radii: Vec3::ONE };

        let miss = Ray::new(Vec3::new(0.0, 2.0, 5.0), -Vec3::Z);
        assert!(sphere.intersect_local(&miss).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(sphere.intersect_local(&behind).is_none());
    }

    #[test]
    fn test_box_entry_face() {
        let cube = Shape::Box {
            half_extents: Vec3::new(1.0, 2.0, 3.0),
        };
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y);

        let hit = cube.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 8.0));
        assert_eq!(hit.normal, Vec3::Y);
        assert!(!hit.is_inside);
    }

    #[test]
    fn test_box_from_inside() {
        let cube = Shape::Box {
            half_extents: Vec3::ONE,
        };
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let hit = cube.intersect_local(&ray).unwrap();
        assert!(approx_eq(hit.t, 1.0));
        assert_eq!(hit.normal, Vec3::Z);
        assert!(hit.is_inside);
    }

    #[test]
    fn test_box_axis_parallel_ray_outside_slab_misses() {
        let cube = Shape::Box {
            half_extents: Vec3::ONE,
        };
        // Zero x and y direction components, origin outside the x slab
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), -Vec3::Z);
        assert!(cube.intersect_local(&ray).is_none());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let tri = Shape::Triangle {
            a: Vec3::new(-1.0, -1.0, 0.0),
            b: Vec3::new(1.0, -1.0, 0.0),
            c: Vec3::new(0.0, 1.0, 0.0),
        };

        let front = Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);
        let hit = tri.intersect_local(&front).unwrap();
        assert!(approx_eq(hit.t, 2.0));
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert!(!hit.is_inside);

        // Triangles are two-sided
        let back = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let hit = tri.intersect_local(&back).unwrap();
        assert!((hit.normal + Vec3::Z).length() < 1e-4);

        let outside = Ray::new(Vec3::new(2.0, 2.0, 2.0), -Vec3::Z);
        assert!(tri.intersect_local(&outside).is_none());

        let parallel = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::X);
        assert!(tri.intersect_local(&parallel).is_none());
    }

    #[test]
    fn test_local_corners() {
        assert!(Shape::Plane { normal: Vec3::Y }.local_corners().is_none());

        let corners = Shape::Box {
            half_extents: Vec3::new(1.0, 2.0, 3.0),
        }
        .local_corners()
        .unwrap();
        assert_eq!(corners.len(), 8);
        let aabb = Aabb::from_points(corners);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    fn vec3_in(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec3> {
        (range.clone(), range.clone(), range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn unit_dir() -> impl Strategy<Value = Vec3> {
        vec3_in(-1.0..1.0)
            .prop_filter("non-degenerate direction", |v| v.length() > 0.1)
            .prop_map(|v| v.normalize())
    }

    proptest! {
        #[test]
        fn box_normals_are_axis_aligned_and_face_the_ray(
            half_extents in vec3_in(0.1..3.0),
            origin in vec3_in(-6.0..6.0),
            direction in unit_dir(),
        ) {
            let shape = Shape::Box { half_extents };
            let ray = Ray::new(origin, direction);
            if let Some(hit) = shape.intersect_local(&ray) {
                let n = hit.normal;
                let axis_count = [n.x, n.y, n.z].iter().filter(|c| c.abs() == 1.0).count();
                let zero_count = [n.x, n.y, n.z].iter().filter(|c| **c == 0.0).count();
                prop_assert_eq!(axis_count, 1);
                prop_assert_eq!(zero_count, 2);
                prop_assert!(n.dot(ray.direction) <= 1e-5);
                prop_assert!(hit.t >= 0.0);
            }
        }
    }
}
