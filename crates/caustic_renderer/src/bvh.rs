//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in one flat array and refer to their children by index; a
//! child is always stored after its parent. The BVH owns its objects and
//! reorders them during the build so that every leaf covers a contiguous
//! range.

use caustic_core::{GeometryError, Intersection, Object, Shape};
use caustic_math::{Aabb, Ray, Vec3};

use crate::distribution::{Distribution, LightDistribution};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Growth applied to node bounds during traversal, so flat boxes stay hittable.
const TRAVERSAL_PADDING: f32 = 1e-4;

/// Contents of a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Objects `start..end` of the backing array.
    Leaf { start: usize, end: usize },
    /// Indices of the two child nodes.
    Internal { left: usize, right: usize },
}

/// A BVH node: bounds plus either a leaf range or two children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub kind: NodeKind,
}

impl BvhNode {
    fn placeholder() -> Self {
        Self {
            bounds: Aabb::EMPTY,
            kind: NodeKind::Leaf { start: 0, end: 0 },
        }
    }
}

/// Nearest hit found by traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub intersection: Intersection,
    /// Index into `Bvh::objects`
    pub object: usize,
}

/// Primitive reference used while building.
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    index: usize,
    bounds: Aabb,
}

/// BVH over bounded objects.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    objects: Vec<Object>,
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build a BVH over `objects`.
    ///
    /// Fails if any object is unbounded; planes must be filtered out first.
    pub fn build(objects: Vec<Object>) -> Result<Self, GeometryError> {
        let mut items = objects
            .iter()
            .enumerate()
            .map(|(index, object)| object.aabb().map(|bounds| BuildItem { index, bounds }))
            .collect::<Result<Vec<_>, GeometryError>>()?;

        let mut nodes = Vec::new();
        if !items.is_empty() {
            nodes.push(BvhNode::placeholder());
            build_node(&mut items, 0, 0, &mut nodes);
        }

        // Apply the build order to the backing array
        let mut slots: Vec<Option<Object>> = objects.into_iter().map(Some).collect();
        let objects: Vec<Object> = items
            .iter()
            .filter_map(|item| slots[item.index].take())
            .collect();

        let bvh = Self { objects, nodes };
        log::debug!(
            "BVH built: {} objects, {} nodes, {} leaves",
            bvh.objects.len(),
            bvh.nodes.len(),
            bvh.leaf_ranges().len()
        );
        Ok(bvh)
    }

    /// Objects in build order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object ranges of all leaves, in node order.
    pub fn leaf_ranges(&self) -> Vec<std::ops::Range<usize>> {
        self.nodes
            .iter()
            .filter_map(|node| match node.kind {
                NodeKind::Leaf { start, end } => Some(start..end),
                NodeKind::Internal { .. } => None,
            })
            .collect()
    }

    /// Find the nearest object hit by `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        let root = self.nodes.first()?;
        entry_distance(&root.bounds, ray)?;
        self.intersect_node(0, ray)
    }

    fn intersect_node(&self, index: usize, ray: &Ray) -> Option<Hit> {
        match self.nodes[index].kind {
            NodeKind::Leaf { start, end } => nearest_in(&self.objects[start..end], start, ray),
            NodeKind::Internal { left, right } => {
                let left_entry = entry_distance(&self.nodes[left].bounds, ray);
                let right_entry = entry_distance(&self.nodes[right].bounds, ray);

                let (near, far, far_entry) = match (left_entry, right_entry) {
                    (None, None) => return None,
                    (Some(_), None) => return self.intersect_node(left, ray),
                    (None, Some(_)) => return self.intersect_node(right, ray),
                    (Some(l), Some(r)) if l <= r => (left, right, r),
                    (Some(l), Some(_)) => (right, left, l),
                };

                let near_hit = self.intersect_node(near, ray);
                if let Some(hit) = near_hit {
                    // Nothing in the far box can be closer than its entry point
                    if hit.intersection.t < far_entry {
                        return Some(hit);
                    }
                }
                closer(near_hit, self.intersect_node(far, ray))
            }
        }
    }

    /// Combined light-sampling density of every object along a direction.
    ///
    /// Each object contributes independently; occlusion between them is
    /// ignored.
    pub fn pdf(&self, point: Vec3, normal: Vec3, direction: Vec3) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let probe = Ray::from_unit(point, direction);
        self.pdf_node(0, &probe, point, normal, direction)
    }

    fn pdf_node(&self, index: usize, probe: &Ray, point: Vec3, normal: Vec3, direction: Vec3) -> f32 {
        let node = &self.nodes[index];
        if entry_distance(&node.bounds, probe).is_none() {
            return 0.0;
        }
        match node.kind {
            NodeKind::Leaf { start, end } => self.objects[start..end]
                .iter()
                .map(|object| LightDistribution::new(object).pdf(point, normal, direction))
                .sum(),
            NodeKind::Internal { left, right } => {
                self.pdf_node(left, probe, point, normal, direction)
                    + self.pdf_node(right, probe, point, normal, direction)
            }
        }
    }
}

/// Recursively partition `items`, writing the node at `index`.
///
/// `offset` is the position of `items[0]` in the backing array.
fn build_node(items: &mut [BuildItem], offset: usize, index: usize, nodes: &mut Vec<BvhNode>) {
    let n = items.len();
    let bounds = items
        .iter()
        .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bounds));
    let leaf = BvhNode {
        bounds,
        kind: NodeKind::Leaf {
            start: offset,
            end: offset + n,
        },
    };

    if n <= LEAF_MAX_SIZE {
        nodes[index] = leaf;
        return;
    }

    // Splitting has to beat the cost of keeping everything in one node
    let mut best_score = bounds.score() * n as f32;
    let mut best: Option<(usize, usize)> = None;
    for axis in 0..3 {
        sort_by_axis(items, axis);
        if let Some((split, score)) = find_partition(items, best_score) {
            best_score = score;
            best = Some((axis, split));
        }
    }

    let Some((axis, split)) = best else {
        nodes[index] = leaf;
        return;
    };
    // The scan leaves the slice sorted along the last axis
    if axis != 2 {
        sort_by_axis(items, axis);
    }

    let (left_items, right_items) = items.split_at_mut(split);

    let left = nodes.len();
    nodes.push(BvhNode::placeholder());
    build_node(left_items, offset, left, nodes);

    let right = nodes.len();
    nodes.push(BvhNode::placeholder());
    build_node(right_items, offset + split, right, nodes);

    nodes[index] = BvhNode {
        bounds,
        kind: NodeKind::Internal { left, right },
    };
}

fn sort_by_axis(items: &mut [BuildItem], axis: usize) {
    items.sort_by(|a, b| {
        a.bounds
            .axis_center(axis)
            .total_cmp(&b.bounds.axis_center(axis))
    });
}

/// Best split of a sorted slice whose cost is strictly below `threshold`.
///
/// Cost of splitting before `i` is `score(left) * i + score(right) * (n - i)`.
/// Split points are scanned from the right, so among equal costs the
/// largest `i` wins.
fn find_partition(items: &[BuildItem], threshold: f32) -> Option<(usize, f32)> {
    let n = items.len();

    let mut prefix = vec![Aabb::EMPTY; n + 1];
    for i in 0..n {
        prefix[i + 1] = Aabb::surrounding(&prefix[i], &items[i].bounds);
    }
    let mut suffix = vec![Aabb::EMPTY; n + 1];
    for i in (0..n).rev() {
        suffix[i] = Aabb::surrounding(&suffix[i + 1], &items[i].bounds);
    }

    let mut best: Option<(usize, f32)> = None;
    let mut best_score = threshold;
    for i in (1..n).rev() {
        let score = prefix[i].score() * i as f32 + suffix[i].score() * (n - i) as f32;
        if score < best_score {
            best_score = score;
            best = Some((i, score));
        }
    }
    best
}

/// Distance at which `ray` enters the padded `bounds`, 0 if it starts inside.
fn entry_distance(bounds: &Aabb, ray: &Ray) -> Option<f32> {
    let shape = Shape::Box {
        half_extents: bounds.half_extents() + Vec3::splat(TRAVERSAL_PADDING),
    };
    let local = Ray::from_unit(ray.origin - bounds.centroid(), ray.direction);
    let hit = shape.intersect_local(&local)?;
    Some(if hit.is_inside { 0.0 } else { hit.t })
}

/// Nearest hit among `objects`, reporting indices shifted by `offset`.
///
/// Ties keep the earlier object.
pub(crate) fn nearest_in(objects: &[Object], offset: usize, ray: &Ray) -> Option<Hit> {
    objects
        .iter()
        .enumerate()
        .filter_map(|(i, object)| {
            object.intersect(ray).map(|intersection| Hit {
                intersection,
                object: offset + i,
            })
        })
        .fold(None, |best, hit| closer(best, Some(hit)))
}

#[inline]
fn closer(a: Option<Hit>, b: Option<Hit>) -> Option<Hit> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.intersection.t < a.intersection.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}
