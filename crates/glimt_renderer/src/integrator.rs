//! Iterative path integrator.
//!
//! Walks one ray through the scene with an explicit loop rather than
//! recursion, multiplying attenuations into a running throughput. Paths
//! end by escaping into the sky, being absorbed, or running out of
//! scatter budget.

use glimt_math::{Interval, Ray, Vec3};
use glimt_scene::Scene;
use rand::RngCore;

use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::intersect::intersect_scene;
use crate::material::scatter;

/// Near clip for secondary rays. Keeps bounces from re-hitting the
/// surface they just left.
const T_MIN: f32 = 0.001;

/// Background radiance for a ray that escapes the scene.
///
/// Vertical white-to-blue gradient keyed on the ray direction.
pub fn sky_gradient(ray: &Ray) -> Vec3 {
    let unit_direction = ray.direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    (1.0 - a) * Vec3::ONE + a * Vec3::new(0.5, 0.7, 1.0)
}

/// Trace one path and return its radiance estimate.
///
/// `max_depth` is the number of scatter events the path may spend. A ray
/// that still has a surface in front of it when the budget runs out
/// terminates with whatever throughput it accumulated.
pub fn trace_ray(
    scene: &Scene,
    bvh: &Bvh,
    ray: &Ray,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let mut throughput = Vec3::ONE;
    let mut ray = *ray;

    for bounce in 0..=max_depth {
        let hit = match intersect_scene(scene, bvh, &ray, Interval::new(T_MIN, f32::INFINITY)) {
            Some(hit) => hit,
            None => return throughput * sky_gradient(&ray),
        };

        if bounce == max_depth {
            break; // scatter budget spent
        }

        match scatter(scene, &ray, &hit, rng) {
            Some(s) => {
                throughput *= s.attenuation;
                ray = s.ray;
            }
            None => return Vec3::ZERO,
        }
    }

    throughput
}

/// Average `samples_per_pixel` jittered paths through one pixel.
pub fn render_pixel(
    scene: &Scene,
    bvh: &Bvh,
    camera: &Camera,
    x: u32,
    y: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let mut color = Vec3::ZERO;
    for _ in 0..samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        color += trace_ray(scene, bvh, &ray, max_depth, rng);
    }
    color / samples_per_pixel as f32
}
