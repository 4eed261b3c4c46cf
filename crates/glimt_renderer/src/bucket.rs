//! Bucketed frame decomposition.
//!
//! The image is cut into fixed-size rectangular cells so frame rendering
//! can hand independent chunks of pixels to the thread pool. Each pixel
//! owns a counter-based RNG stream, so bucket shape never changes the
//! image.

use glimt_math::Vec3;
use glimt_scene::Scene;

use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::integrator::render_pixel;
use crate::renderer::RenderSettings;
use crate::rng::pixel_rng;

/// Default edge length of a render bucket in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 8;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels, already clamped to the image
    pub width: u32,
    /// Height in pixels, already clamped to the image
    pub height: u32,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels in this bucket
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Rendered pixels for one bucket, in row-major bucket-local order.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Vec3>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Vec3>) -> Self {
        Self { bucket, pixels }
    }
}

/// Cut an image into buckets of at most `bucket_size` on a side.
///
/// Row-major order; edge buckets are clamped so the cells tile the image
/// exactly.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let bucket_height = bucket_size.min(height - y);
        let mut x = 0;
        while x < width {
            let bucket_width = bucket_size.min(width - x);
            buckets.push(Bucket::new(x, y, bucket_width, bucket_height));
            x += bucket_width;
        }
        y += bucket_height;
    }

    buckets
}

/// Render every pixel of one bucket.
///
/// Each pixel seeds its own RNG from `frame_seed` and its image
/// coordinates, so the result depends only on the frame seed and not on
/// which thread or bucket the pixel landed in. A bucket lying entirely
/// outside the image contributes nothing.
pub fn render_bucket(
    bucket: &Bucket,
    scene: &Scene,
    bvh: &Bvh,
    camera: &Camera,
    settings: &RenderSettings,
    frame_seed: u64,
) -> Vec<Vec3> {
    if bucket.x >= camera.width() || bucket.y >= camera.height() {
        return Vec::new();
    }

    let samples_per_pixel = settings.samples_per_pixel.max(1);
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for y in bucket.y..bucket.y + bucket.height {
        for x in bucket.x..bucket.x + bucket.width {
            let mut rng = pixel_rng(frame_seed, x, y, camera.width());
            pixels.push(render_pixel(
                scene,
                bvh,
                camera,
                x,
                y,
                samples_per_pixel,
                settings.max_depth,
                &mut rng,
            ));
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraBasis;
    use glimt_scene::Scene;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4);

        let total: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total, 128 * 128);

        for bucket in &buckets {
            assert_eq!(bucket.width, 64);
            assert_eq!(bucket.height, 64);
        }
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4);

        let total: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total, 100 * 100);

        // Edge cells are clamped
        assert_eq!(buckets[1].width, 36);
        assert_eq!(buckets[2].height, 36);
    }

    #[test]
    fn test_generate_buckets_single_cell() {
        let buckets = generate_buckets(7, 5, 64);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0], Bucket::new(0, 0, 7, 5));
    }

    #[test]
    fn test_render_bucket_out_of_range() {
        let mut scene = Scene::new();
        let bvh = Bvh::build(&mut scene).unwrap();
        let camera = Camera::new(CameraBasis::default(), 8, 8);
        let settings = RenderSettings::default();

        let outside = Bucket::new(8, 0, 4, 4);
        let pixels = render_bucket(&outside, &scene, &bvh, &camera, &settings, 0);
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_render_bucket_deterministic() {
        let mut scene = Scene::new();
        let bvh = Bvh::build(&mut scene).unwrap();
        let camera = Camera::new(CameraBasis::default(), 8, 8);
        let settings = RenderSettings::default();

        let bucket = Bucket::new(0, 0, 4, 4);
        let a = render_bucket(&bucket, &scene, &bvh, &camera, &settings, 7);
        let b = render_bucket(&bucket, &scene, &bvh, &camera, &settings, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }
}
