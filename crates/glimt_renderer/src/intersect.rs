//! Ray/scene intersection.
//!
//! Sphere tests use the half-b quadratic form. Scene traversal walks the
//! flattened BVH iteratively with a fixed-size index stack; there is no
//! recursion anywhere on the hit path.

use glimt_math::{Interval, Ray, Vec3};
use glimt_scene::{MaterialRef, Object, Scene, ShapeRef, Sphere};

use crate::bvh::Bvh;

/// Traversal stack capacity. Twice the builder's depth cap; at most one
/// sibling is parked per level, so trees the builder emits cannot fill it.
const TRAVERSAL_STACK_SIZE: usize = 64;

/// Record of a ray/object intersection.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Ray parameter at the intersection
    pub t: f32,

    /// Intersection point in world space
    pub point: Vec3,

    /// Surface normal, always facing against the incoming ray
    pub normal: Vec3,

    /// False when the ray started inside the primitive
    pub front_face: bool,

    /// Material of the object that was hit
    pub material: MaterialRef,
}

/// Intersect a ray with one sphere.
///
/// Prefers the closer quadratic root strictly inside `ray_t` and falls
/// back to the far one, so rays starting inside the sphere still hit its
/// far wall. The reported normal is flipped to face the ray; `front_face`
/// records which side was struck.
pub fn sphere_hit(
    sphere: &Sphere,
    ray: &Ray,
    ray_t: Interval,
    material: MaterialRef,
) -> Option<Hit> {
    let oc = sphere.center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    // Nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let point = ray.at(root);
    let outward_normal = (point - sphere.center) / sphere.radius;
    let front_face = ray.direction.dot(outward_normal) < 0.0;

    Some(Hit {
        t: root,
        point,
        normal: if front_face {
            outward_normal
        } else {
            -outward_normal
        },
        front_face,
        material,
    })
}

/// Dispatch one object's shape. Kinds without a table were rejected at
/// build; if one slips through it is skipped, never mis-intersected.
fn object_hit(scene: &Scene, object: &Object, ray: &Ray, ray_t: Interval) -> Option<Hit> {
    match object.shape {
        ShapeRef::Sphere(index) => {
            let sphere = scene.spheres.get(index as usize)?;
            sphere_hit(sphere, ray, ray_t, object.material)
        }
        _ => None,
    }
}

/// Find the closest intersection along a ray using the BVH.
///
/// Iterative traversal over the flat node array. Nodes are culled against
/// the live interval, which shrinks as closer hits are found. A full
/// stack drops the subtree instead of overflowing, turning it into a miss.
pub fn intersect_scene(scene: &Scene, bvh: &Bvh, ray: &Ray, ray_t: Interval) -> Option<Hit> {
    let nodes = bvh.nodes();
    if nodes.is_empty() {
        return None;
    }

    let mut closest: Option<Hit> = None;
    let mut closest_t = ray_t.max;

    let mut stack = [0u32; TRAVERSAL_STACK_SIZE];
    let mut stack_len = 1usize; // root pre-pushed

    while stack_len > 0 {
        stack_len -= 1;
        let node = match nodes.get(stack[stack_len] as usize) {
            Some(node) => node,
            None => continue,
        };

        if !node.bounds().hit(ray, Interval::new(ray_t.min, closest_t)) {
            continue;
        }

        if node.is_leaf() {
            let start = node.start_index as usize;
            let end = start + node.obj_count as usize;
            if let Some(range) = scene.objects.get(start..end) {
                for object in range {
                    let interval = Interval::new(ray_t.min, closest_t);
                    if let Some(hit) = object_hit(scene, object, ray, interval) {
                        closest_t = hit.t;
                        closest = Some(hit);
                    }
                }
            }
        } else if stack_len + 2 <= TRAVERSAL_STACK_SIZE {
            stack[stack_len] = node.start_index;
            stack[stack_len + 1] = node.start_index + 1;
            stack_len += 2;
        }
    }

    closest
}

/// Find the closest intersection by scanning every object.
///
/// The reference answer the BVH path is checked against in tests, and the
/// fallback when no hierarchy is available.
pub fn intersect_scene_linear(scene: &Scene, ray: &Ray, ray_t: Interval) -> Option<Hit> {
    let mut closest: Option<Hit> = None;
    let mut closest_t = ray_t.max;

    for object in &scene.objects {
        let interval = Interval::new(ray_t.min, closest_t);
        if let Some(hit) = object_hit(scene, object, ray, interval) {
            closest_t = hit.t;
            closest = Some(hit);
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimt_scene::{presets, SceneBuilder};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn material() -> MaterialRef {
        MaterialRef::Lambertian(0)
    }

    #[test]
    fn test_sphere_hit_head_on() {
        // Sphere dead ahead at distance 3, radius 0.5
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let hit = sphere_hit(&sphere, &ray, Interval::new(0.001, f32::INFINITY), material())
            .expect("should hit");

        assert!((hit.t - 2.5).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!(hit.front_face);
        assert!((hit.point - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere_hit(&sphere, &ray, Interval::new(0.001, f32::INFINITY), material())
            .expect("should hit far wall");

        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!(!hit.front_face);
        // Normal faces back against the ray
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        assert!(sphere_hit(&sphere, &ray, Interval::new(0.001, f32::INFINITY), material()).is_none());
    }

    #[test]
    fn test_sphere_hit_respects_t_min() {
        // Ray starting on the surface must not re-hit the near wall
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);

        let hit = sphere_hit(&sphere, &ray, Interval::new(0.001, f32::INFINITY), material())
            .expect("should hit far wall");
        assert!((hit.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_traversal_matches_linear_scan() {
        let mut scene = presets::random_spheres(5).unwrap();
        let bvh = crate::bvh::Bvh::build(&mut scene).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let origin = Vec3::new(
                rng.gen::<f32>() * 20.0 - 10.0,
                rng.gen::<f32>() * 6.0,
                rng.gen::<f32>() * 20.0 - 10.0,
            );
            let direction = Vec3::new(
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
            );
            if direction.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, direction);
            let interval = Interval::new(0.001, f32::INFINITY);

            let fast = intersect_scene(&scene, &bvh, &ray, interval);
            let slow = intersect_scene_linear(&scene, &ray, interval);

            match (fast, slow) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert!((a.t - b.t).abs() < 1e-4, "t mismatch: {} vs {}", a.t, b.t);
                    assert_eq!(a.material, b.material);
                    assert_eq!(a.front_face, b.front_face);
                }
                (a, b) => panic!("hit disagreement: {:?} vs {:?}", a, b),
            }
        }
    }

    #[test]
    fn test_traversal_empty_scene() {
        let mut scene = Scene::new();
        let bvh = crate::bvh::Bvh::build(&mut scene).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(intersect_scene(&scene, &bvh, &ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_unimplemented_shape_skipped() {
        let mut builder = SceneBuilder::new();
        let gray = builder.add_lambertian(Vec3::splat(0.5));
        builder.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray);
        let mut scene = builder.build().unwrap();

        // Corrupt the shape handle after validation; the scan must skip it
        scene.objects[0].shape = ShapeRef::Box(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(intersect_scene_linear(&scene, &ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_closest_of_two_spheres() {
        let mut builder = SceneBuilder::new();
        let gray = builder.add_lambertian(Vec3::splat(0.5));
        let red = builder.add_lambertian(Vec3::new(0.9, 0.1, 0.1));
        builder.add_sphere(Vec3::new(0.0, 0.0, -5.0), 0.5, gray);
        builder.add_sphere(Vec3::new(0.0, 0.0, -2.0), 0.5, red);
        let mut scene = builder.build().unwrap();
        let bvh = crate::bvh::Bvh::build(&mut scene).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = intersect_scene(&scene, &bvh, &ray, Interval::new(0.001, f32::INFINITY))
            .expect("should hit near sphere");

        assert!((hit.t - 1.5).abs() < 1e-5);
        assert_eq!(hit.material, red);
    }
}
