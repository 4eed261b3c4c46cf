//! Bounding volume hierarchy over the scene's object table.
//!
//! Built once per scene with an exhaustive surface-area-heuristic sweep
//! and flattened into a compact node array. The build reorders the object
//! table in place so every leaf owns a contiguous run of it. Traversal
//! lives in `intersect` and never recurses.

use bytemuck::{Pod, Zeroable};
use glimt_math::{Aabb, Vec3};
use glimt_scene::{Object, Scene, SceneError, ShapeRef};
use thiserror::Error;

/// Errors found while building the hierarchy.
#[derive(Error, Debug)]
pub enum BvhError {
    #[error(transparent)]
    InvalidScene(#[from] SceneError),
}

pub type BvhResult<T> = Result<T, BvhError>;

/// Build depth cap. A balanced tree this deep covers billions of objects,
/// so hitting it means the partitioning degenerated; the node is forced
/// into a leaf instead of recursing further.
const MAX_BUILD_DEPTH: u32 = 32;

/// One node of the flattened hierarchy, 32 bytes.
///
/// `obj_count > 0` marks a leaf owning `obj_count` entries of the object
/// table starting at `start_index`. Internal nodes keep their left child
/// index in `start_index`; the right child is always `start_index + 1`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    pub aabb_min: Vec3,
    pub start_index: u32,
    pub aabb_max: Vec3,
    pub obj_count: u32,
}

impl BvhNode {
    /// Node bounds as an Aabb value.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.aabb_min, self.aabb_max)
    }

    /// True when the node owns objects directly.
    pub fn is_leaf(&self) -> bool {
        self.obj_count > 0
    }
}

/// Scratch record carried through the build, one per object.
#[derive(Clone, Copy)]
struct BuildPrim {
    object: Object,
    bounds: Aabb,
    centroid: Vec3,
}

/// Flattened hierarchy over a scene's object table.
///
/// Immutable once built; node 0 is the root. An empty scene builds an
/// empty node array.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build the hierarchy for a scene, reordering `scene.objects` in
    /// place so leaves reference contiguous runs of the table.
    ///
    /// The scene is validated first; unimplemented shape kinds and stale
    /// table indices fail the build before any rendering happens.
    pub fn build(scene: &mut Scene) -> BvhResult<Self> {
        scene.validate()?;

        let mut prims: Vec<BuildPrim> = scene
            .objects
            .iter()
            .map(|&object| {
                let bounds = object_bounds(scene, &object);
                BuildPrim {
                    object,
                    bounds,
                    centroid: bounds.centroid(),
                }
            })
            .collect();

        if prims.is_empty() {
            log::info!("BVH build: empty scene, no nodes");
            return Ok(Self { nodes: Vec::new() });
        }

        let root_bounds = bounds_of(&prims);
        let mut nodes = vec![BvhNode {
            aabb_min: root_bounds.min,
            start_index: 0,
            aabb_max: root_bounds.max,
            obj_count: prims.len() as u32,
        }];

        let mut deepest = 0;
        split_node(&mut nodes, 0, &mut prims, 0, &mut deepest);

        // Write the leaf ordering back to the scene table
        for (object, prim) in scene.objects.iter_mut().zip(&prims) {
            *object = prim.object;
        }

        let leaf_count = nodes.iter().filter(|n| n.is_leaf()).count();
        log::info!(
            "BVH build: {} objects, {} nodes ({} leaves), max depth {}",
            prims.len(),
            nodes.len(),
            leaf_count,
            deepest
        );

        Ok(Self { nodes })
    }

    /// The flattened node array. Node 0 is the root.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check structural invariants against the scene this was built for.
    ///
    /// A valid tree has every leaf range inside the object table, the leaf
    /// ranges together covering it exactly once, every object enclosed by
    /// its leaf bounds and child bounds enclosed by their parent. Meant
    /// for tests and debugging, not the render path.
    pub fn validate(&self, scene: &Scene) -> bool {
        if self.nodes.is_empty() {
            return scene.objects.is_empty();
        }

        let mut covered = vec![false; scene.objects.len()];

        for node in &self.nodes {
            if node.is_leaf() {
                let start = node.start_index as usize;
                let end = start + node.obj_count as usize;
                if end > scene.objects.len() {
                    return false;
                }
                for (offset, object) in scene.objects[start..end].iter().enumerate() {
                    if covered[start + offset] {
                        return false; // leaf ranges overlap
                    }
                    covered[start + offset] = true;
                    if !node.bounds().encloses(&object_bounds(scene, object)) {
                        return false;
                    }
                }
            } else {
                let left = node.start_index as usize;
                if left + 1 >= self.nodes.len() {
                    return false;
                }
                let parent = node.bounds();
                if !parent.encloses(&self.nodes[left].bounds())
                    || !parent.encloses(&self.nodes[left + 1].bounds())
                {
                    return false;
                }
            }
        }

        covered.iter().all(|&c| c)
    }
}

/// Bounds for one object. Validation has already rejected kinds without a
/// table; anything else gets an empty box, which no ray can hit.
fn object_bounds(scene: &Scene, object: &Object) -> Aabb {
    match object.shape {
        ShapeRef::Sphere(index) => scene
            .spheres
            .get(index as usize)
            .map(|sphere| sphere.bounds())
            .unwrap_or(Aabb::EMPTY),
        _ => Aabb::EMPTY,
    }
}

fn bounds_of(prims: &[BuildPrim]) -> Aabb {
    prims
        .iter()
        .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounds))
}

/// Split one node if the surface area heuristic says it pays off,
/// otherwise leave it a leaf.
fn split_node(
    nodes: &mut Vec<BvhNode>,
    node_index: usize,
    prims: &mut [BuildPrim],
    depth: u32,
    deepest: &mut u32,
) {
    *deepest = (*deepest).max(depth);

    let node = nodes[node_index];
    let start = node.start_index as usize;
    let count = node.obj_count as usize;

    if count <= 1 {
        return;
    }
    if depth >= MAX_BUILD_DEPTH {
        log::warn!(
            "BVH build: depth cap {} reached, keeping {} objects in one leaf",
            MAX_BUILD_DEPTH,
            count
        );
        return;
    }

    let range = &prims[start..start + count];
    let (axis, split_pos, split_cost) = match best_split(range) {
        Some(best) => best,
        None => return, // all centroids coincide
    };

    // Splitting has to beat scanning the whole leaf
    let parent_cost = count as f32 * node.bounds().half_area();
    if split_cost >= parent_cost {
        return;
    }

    // Two-pointer partition over the node's slice of the table
    let mut left = start;
    let mut right = start + count;
    while left < right {
        if prims[left].centroid[axis] < split_pos {
            left += 1;
        } else {
            right -= 1;
            prims.swap(left, right);
        }
    }
    let left_count = (left - start) as u32;

    let left_bounds = bounds_of(&prims[start..left]);
    let right_bounds = bounds_of(&prims[left..start + count]);

    let left_index = nodes.len() as u32;
    nodes.push(BvhNode {
        aabb_min: left_bounds.min,
        start_index: start as u32,
        aabb_max: left_bounds.max,
        obj_count: left_count,
    });
    nodes.push(BvhNode {
        aabb_min: right_bounds.min,
        start_index: start as u32 + left_count,
        aabb_max: right_bounds.max,
        obj_count: count as u32 - left_count,
    });

    // This node becomes internal, pointing at its children
    nodes[node_index].start_index = left_index;
    nodes[node_index].obj_count = 0;

    split_node(nodes, left_index as usize, prims, depth + 1, deepest);
    split_node(nodes, left_index as usize + 1, prims, depth + 1, deepest);
}

/// Try every object centroid on every axis as a candidate split plane and
/// return the cheapest, as (axis, position, cost).
///
/// Returns None when no candidate produces two non-empty sides, which
/// happens when all centroids coincide.
fn best_split(prims: &[BuildPrim]) -> Option<(usize, f32, f32)> {
    let mut best: Option<(usize, f32, f32)> = None;

    for axis in 0..3 {
        for candidate in prims {
            let split_pos = candidate.centroid[axis];
            let cost = split_cost(prims, axis, split_pos);
            if cost < best.map_or(f32::INFINITY, |(_, _, c)| c) {
                best = Some((axis, split_pos, cost));
            }
        }
    }

    best
}

/// Surface-area-heuristic cost of one candidate plane: each side's object
/// count weighted by its bound's half area. Planes leaving a side empty
/// cost infinity so they can never win.
fn split_cost(prims: &[BuildPrim], axis: usize, split_pos: f32) -> f32 {
    let mut left_box = Aabb::EMPTY;
    let mut right_box = Aabb::EMPTY;
    let mut left_count = 0u32;
    let mut right_count = 0u32;

    for prim in prims {
        if prim.centroid[axis] < split_pos {
            left_box = Aabb::surrounding(&left_box, &prim.bounds);
            left_count += 1;
        } else {
            right_box = Aabb::surrounding(&right_box, &prim.bounds);
            right_count += 1;
        }
    }

    if left_count == 0 || right_count == 0 {
        return f32::INFINITY;
    }

    left_count as f32 * left_box.half_area() + right_count as f32 * right_box.half_area()
}
