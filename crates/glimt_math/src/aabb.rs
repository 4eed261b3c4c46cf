use crate::{Interval, Ray, Vec3};
use bytemuck::{Pod, Zeroable};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as min/max corner points so it can sit directly in flat,
/// upload-ready node records.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min/max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the surface area of the box, the cost metric used for
    /// surface-area-heuristic splits.
    pub fn half_area(&self) -> f32 {
        let d = self.max - self.min;
        d.x * d.y + d.y * d.z + d.z * d.x
    }

    /// Returns true if the point lies within the box (inclusive).
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// Returns true if `other` lies entirely within this box (inclusive).
    pub fn encloses(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method over all three axes at once. Axis-parallel rays get
    /// infinite slab bounds that resolve through the min/max chain; a NaN
    /// from a graze exactly in a slab plane fails the final comparison
    /// and reads as a miss, never as a poisoned result.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        let inv_d = r.direction.recip();
        let t0 = (self.min - r.origin) * inv_d;
        let t1 = (self.max - r.origin) * inv_d;

        let t_near = t0.min(t1).max_element().max(ray_t.min);
        let t_far = t0.max(t1).min_element().min(ray_t.max);
        t_near <= t_far
    }

    /// An empty AABB, the identity for `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}
