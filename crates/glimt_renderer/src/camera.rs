//! Camera ray generation from an externally supplied view basis.

use glimt_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::rng::{gen_f32, random_in_unit_disk};

/// View basis handed in by the host application.
///
/// Navigation is the host's business; the renderer only consumes the
/// resulting orthonormal frame plus lens parameters. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBasis {
    /// Camera position in world space
    pub eye: Vec3,

    /// Unit vector pointing screen-right
    pub right: Vec3,

    /// Unit vector pointing screen-up
    pub up: Vec3,

    /// Unit vector pointing into the scene
    pub forward: Vec3,

    /// Vertical field of view in degrees
    pub vfov: f32,

    /// Distance to the plane of perfect focus
    pub focus_dist: f32,

    /// Lens cone angle in degrees; 0 disables defocus blur
    pub focus_angle: f32,
}

impl CameraBasis {
    /// Build a basis from look-from/look-at points, the usual way demos
    /// and tests set up a view.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        vup: Vec3,
        vfov: f32,
        focus_dist: f32,
        focus_angle: f32,
    ) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(vup).normalize();
        let up = right.cross(forward);

        Self {
            eye,
            right,
            up,
            forward,
            vfov,
            focus_dist,
            focus_angle,
        }
    }
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::NEG_Z,
            vfov: 90.0,
            focus_dist: 1.0,
            focus_angle: 0.0,
        }
    }
}

/// Ray generator for one output resolution.
///
/// Caches the pixel grid derived from the basis; any basis or resolution
/// change rebuilds the cache.
#[derive(Debug, Clone)]
pub struct Camera {
    basis: CameraBasis,
    width: u32,
    height: u32,

    // Cached values (set by recompute())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Create a camera for the given basis and resolution.
    pub fn new(basis: CameraBasis, width: u32, height: u32) -> Self {
        let mut camera = Self {
            basis,
            width,
            height,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        };
        camera.recompute();
        camera
    }

    /// The current view basis.
    pub fn basis(&self) -> &CameraBasis {
        &self.basis
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replace the view basis and rebuild the pixel grid.
    pub fn set_basis(&mut self, basis: CameraBasis) {
        self.basis = basis;
        self.recompute();
    }

    /// Change the output resolution and rebuild the pixel grid.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.recompute();
    }

    fn recompute(&mut self) {
        let b = self.basis;

        // Viewport dimensions at the focus plane
        let theta = b.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * b.focus_dist;
        let viewport_width = viewport_height * (self.width as f32 / self.height as f32);

        let viewport_u = viewport_width * b.right;
        let viewport_v = -viewport_height * b.up;

        self.pixel_delta_u = viewport_u / self.width as f32;
        self.pixel_delta_v = viewport_v / self.height as f32;

        // Upper left pixel center
        let viewport_upper_left =
            b.eye + b.focus_dist * b.forward - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        let defocus_radius = b.focus_dist * (b.focus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = b.right * defocus_radius;
        self.defocus_disk_v = b.up * defocus_radius;
    }

    /// Generate a ray through pixel (x, y) with sub-pixel jitter.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((x as f32) + offset.x) * self.pixel_delta_u
            + ((y as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.basis.focus_angle <= 0.0 {
            self.basis.eye
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.basis.eye + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_look_at_basis_orthonormal() {
        let basis = CameraBasis::look_at(
            Vec3::new(13.0, 2.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
            20.0,
            10.0,
            0.0,
        );

        assert!((basis.forward.length() - 1.0).abs() < 1e-5);
        assert!((basis.right.length() - 1.0).abs() < 1e-5);
        assert!((basis.up.length() - 1.0).abs() < 1e-5);
        assert!(basis.forward.dot(basis.right).abs() < 1e-5);
        assert!(basis.forward.dot(basis.up).abs() < 1e-5);
        assert!(basis.right.dot(basis.up).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_down_negative_z() {
        let basis = CameraBasis::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y, 90.0, 1.0, 0.0);

        assert!((basis.forward - Vec3::NEG_Z).length() < 1e-5);
        assert!((basis.right - Vec3::X).length() < 1e-5);
        assert!((basis.up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_camera_center_ray_points_forward() {
        let camera = Camera::new(CameraBasis::default(), 101, 101);
        let mut rng = StdRng::seed_from_u64(42);

        // Central pixel, jitter stays inside one pixel footprint
        let ray = camera.get_ray(50, 50, &mut rng);
        let dir = ray.direction.normalize();

        assert!(dir.z < -0.9);
        assert!(dir.x.abs() < 0.1);
        assert!(dir.y.abs() < 0.1);
    }

    #[test]
    fn test_camera_no_defocus_keeps_origin() {
        let camera = Camera::new(CameraBasis::default(), 64, 64);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..10 {
            let ray = camera.get_ray(10, 20, &mut rng);
            assert_eq!(ray.origin, Vec3::ZERO);
        }
    }

    #[test]
    fn test_camera_defocus_jitters_origin() {
        let mut basis = CameraBasis::default();
        basis.focus_angle = 10.0;
        basis.focus_dist = 5.0;
        let camera = Camera::new(basis, 64, 64);
        let mut rng = StdRng::seed_from_u64(42);

        let mut moved = false;
        for _ in 0..10 {
            let ray = camera.get_ray(32, 32, &mut rng);
            if ray.origin != Vec3::ZERO {
                moved = true;
            }
            // Origin stays on the lens disk around the eye
            assert!(ray.origin.length() < 5.0 * (5.0f32).to_radians().tan() + 1e-4);
        }
        assert!(moved);
    }

    #[test]
    fn test_camera_resolution_change_rebuilds_grid() {
        let mut camera = Camera::new(CameraBasis::default(), 100, 100);
        let mut rng = StdRng::seed_from_u64(42);
        let before = camera.get_ray(0, 0, &mut rng);

        camera.set_resolution(200, 100);
        let mut rng = StdRng::seed_from_u64(42);
        let after = camera.get_ray(0, 0, &mut rng);

        // Wider aspect pushes the corner pixel further out
        assert!(after.direction.x.abs() > before.direction.x.abs());
    }
}
