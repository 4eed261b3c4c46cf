//! Procedural reference scenes.
//!
//! Seeded variants of the classic sphere-field test scene plus a minimal
//! two-sphere setup. Demos and tests share these so a given seed always
//! produces the same tables.

use glimt_math::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::builder::SceneBuilder;
use crate::tables::{Scene, SceneResult};

/// The classic random sphere field: a large ground sphere, three feature
/// spheres and a seeded grid of small ones.
pub fn random_spheres(seed: u64) -> SceneResult<Scene> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut builder = SceneBuilder::new();

    // Ground
    let ground = builder.add_lambertian(Vec3::splat(0.5));
    builder.add_sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground);

    // Three main spheres
    let glass = builder.add_dielectric(Vec3::ONE, 1.5);
    builder.add_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, glass);

    let matte = builder.add_lambertian(Vec3::new(0.4, 0.2, 0.1));
    builder.add_sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, matte);

    let steel = builder.add_metal(Vec3::new(0.7, 0.6, 0.5), 0.0);
    builder.add_sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, steel);

    // Small random spheres
    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            // Keep clear of the metal feature sphere
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            if choose_mat < 0.8 {
                // Diffuse
                let albedo = Vec3::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                let material = builder.add_lambertian(albedo);
                builder.add_sphere(center, 0.2, material);
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Vec3::new(
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                );
                let fuzz = 0.5 * rng.gen::<f32>();
                let material = builder.add_metal(albedo, fuzz);
                builder.add_sphere(center, 0.2, material);
            } else {
                // Glass
                builder.add_sphere(center, 0.2, glass);
            }
        }
    }

    builder.build()
}

/// A gray sphere resting on a large ground sphere, straight down -Z from
/// the origin. Small enough to reason about analytically.
pub fn two_spheres() -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    let gray = builder.add_lambertian(Vec3::splat(0.5));
    builder.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray);
    builder.add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, gray);

    builder.build()
}
