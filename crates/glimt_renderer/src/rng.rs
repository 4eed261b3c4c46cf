//! Deterministic per-pixel sample streams.
//!
//! Every pixel of every frame draws from its own PCG stream, so a frame is
//! reproducible for a given seed no matter how buckets get scheduled.

use glimt_math::Vec3;
use rand::{Rng, RngCore};
use rand_pcg::Pcg32;

/// Build the generator for one pixel of one frame.
///
/// The frame seed selects the state and the pixel's linear index selects
/// the PCG stream. Distinct streams are distinct sequences, so neighboring
/// pixels never share a sample pattern within a frame.
pub fn pixel_rng(frame_seed: u64, x: u32, y: u32, width: u32) -> Pcg32 {
    let stream = y as u64 * width as u64 + x as u64;
    Pcg32::new(frame_seed, stream)
}

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

/// Generate a random unit vector on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling for a uniform direction
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Sample a random point in the unit disk (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rng_reproducible() {
        let mut a = pixel_rng(7, 3, 5, 64);
        let mut b = pixel_rng(7, 3, 5, 64);

        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_pixel_rng_streams_differ() {
        // Neighboring pixels of the same frame
        let mut a = pixel_rng(7, 0, 0, 64);
        let mut b = pixel_rng(7, 1, 0, 64);

        let draws_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_pixel_rng_frames_differ() {
        // Same pixel across two frames
        let mut a = pixel_rng(7, 3, 5, 64);
        let mut b = pixel_rng(8, 3, 5, 64);

        let draws_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = pixel_rng(42, 0, 0, 1);

        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_random_in_unit_disk() {
        let mut rng = pixel_rng(42, 0, 0, 1);

        for _ in 0..100 {
            let p = random_in_unit_disk(&mut rng);
            assert_eq!(p.z, 0.0);
            assert!(p.length_squared() < 1.0);
        }
    }
}
