use crate::Vec3;

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as a pair of world-space corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty AABB (contains nothing). Neutral element of `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a new AABB from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create the smallest AABB containing every point.
    ///
    /// Returns `Aabb::EMPTY` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Aabb::EMPTY, |acc, p| Aabb {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Extents along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half of the extents along each axis.
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Sum of the two corners along one axis (0=X, 1=Y, 2=Z).
    ///
    /// Twice the centroid coordinate; used as the BVH sort key.
    pub fn axis_center(&self, axis: usize) -> f32 {
        self.min[axis] + self.max[axis]
    }

    /// Sum of the three face-area products of the extents.
    ///
    /// Half of the surface area. The BVH split heuristic and the box light
    /// sampler are both written against this quantity.
    pub fn score(&self) -> f32 {
        let size = self.size();
        (size.x * size.y).abs() + (size.x * size.z).abs() + (size.y * size.z).abs()
    }

    /// Grow the box by `delta` on every side.
    pub fn expand(&self, delta: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(delta),
            max: self.max + Vec3::splat(delta),
        }
    }

    /// Test if a point lies inside the box grown by `tolerance`.
    pub fn contains(&self, point: Vec3, tolerance: f32) -> bool {
        let grown = self.expand(tolerance);
        point.cmpge(grown.min).all() && point.cmple(grown.max).all()
    }

    /// The 8 corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}
