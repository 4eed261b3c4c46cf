//! Stochastic surface response.
//!
//! One entry point, [`scatter`], dispatches on the hit's material handle
//! and produces the bounced ray plus a color attenuation. Returning
//! `None` means the ray was absorbed and contributes nothing.

use glimt_math::{Ray, Vec3};
use glimt_scene::{Dielectric, Lambertian, MaterialRef, Metal, Scene};
use rand::RngCore;

use crate::intersect::Hit;
use crate::rng::{gen_f32, random_unit_vector};

/// Outcome of a scattering event.
#[derive(Debug, Clone, Copy)]
pub struct Scatter {
    /// Per-channel reflectance applied to the path throughput
    pub attenuation: Vec3,

    /// The bounced ray, origin on the surface
    pub ray: Ray,
}

/// Scatter an incoming ray off the surface described by `hit`.
///
/// Looks the material record up in the scene tables; a handle pointing
/// past its table absorbs the ray rather than panicking.
pub fn scatter(scene: &Scene, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<Scatter> {
    match hit.material {
        MaterialRef::Lambertian(index) => {
            let material = scene.lambertians.get(index as usize)?;
            Some(scatter_lambertian(material, hit, rng))
        }
        MaterialRef::Metal(index) => {
            let material = scene.metals.get(index as usize)?;
            scatter_metal(material, ray_in, hit, rng)
        }
        MaterialRef::Dielectric(index) => {
            let material = scene.dielectrics.get(index as usize)?;
            Some(scatter_dielectric(material, ray_in, hit, rng))
        }
    }
}

fn scatter_lambertian(material: &Lambertian, hit: &Hit, rng: &mut dyn RngCore) -> Scatter {
    let mut direction = hit.normal + random_unit_vector(rng);

    // Catch degenerate scatter direction
    if direction.abs().max_element() < 1e-3 {
        direction = hit.normal;
    }

    Scatter {
        attenuation: material.albedo,
        ray: Ray::new(hit.point, direction),
    }
}

fn scatter_metal(material: &Metal, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<Scatter> {
    let reflected = reflect(ray_in.direction.normalize(), hit.normal);
    let direction = reflected + material.fuzz * random_unit_vector(rng);

    // Fuzz can push the ray under the surface; absorb those
    if direction.dot(hit.normal) <= 0.0 {
        return None;
    }

    Some(Scatter {
        attenuation: material.albedo,
        ray: Ray::new(hit.point, direction),
    })
}

fn scatter_dielectric(
    material: &Dielectric,
    ray_in: &Ray,
    hit: &Hit,
    rng: &mut dyn RngCore,
) -> Scatter {
    let refraction_ratio = if hit.front_face {
        1.0 / material.ior
    } else {
        material.ior
    };

    let unit_direction = ray_in.direction.normalize();
    let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    let cannot_refract = refraction_ratio * sin_theta > 1.0;
    let direction = if cannot_refract || reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
        reflect(unit_direction, hit.normal)
    } else {
        refract(unit_direction, hit.normal, refraction_ratio)
    };

    Scatter {
        attenuation: material.albedo,
        ray: Ray::new(hit.point, direction),
    }
}

/// Mirror `v` about the normal `n`.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Bend a unit vector through the surface by Snell's law.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for Fresnel reflectance.
fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = (1.0 - refraction_ratio) / (1.0 + refraction_ratio);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
