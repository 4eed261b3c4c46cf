//! Temporal sample accumulation and display conversion.
//!
//! Frames are blended into a running linear-light average weighted by how
//! many samples each side carries. Everything stays linear until
//! [`Accumulator::resolve`] applies the display transform.

use glimt_math::Vec3;

/// Exponent of the display gamma curve, approximately 1/2.2.
const GAMMA_EXPONENT: f32 = 0.4545;

/// Running per-pixel average of path traced samples.
///
/// A fresh accumulator reports zero gathered samples, so the first frame
/// blended into it lands with weight one and fully overwrites the buffer.
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
    samples_gathered: f32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; (width * height) as usize],
            samples_gathered: 0.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Accumulated linear-light pixels, row-major
    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    /// Effective sample count currently represented by the buffer
    pub fn samples_gathered(&self) -> f32 {
        self.samples_gathered
    }

    /// Blend weight the next frame of `samples_per_pixel` would receive
    pub fn next_weight(&self, samples_per_pixel: u32) -> f32 {
        let incoming = samples_per_pixel as f32;
        incoming / (self.samples_gathered + incoming)
    }

    /// Fold one rendered frame into the running average.
    ///
    /// `frame` must be a full image in the accumulator's resolution. The
    /// blend weight is the frame's share of all samples seen so far, so a
    /// long-lived accumulator refines instead of flickering.
    pub fn blend(&mut self, frame: &[Vec3], samples_per_pixel: u32) {
        let weight = self.next_weight(samples_per_pixel);
        for (pixel, estimate) in self.pixels.iter_mut().zip(frame) {
            *pixel = pixel.lerp(*estimate, weight);
        }
        self.samples_gathered += samples_per_pixel as f32;
    }

    /// Age the history down after a camera change.
    ///
    /// The retained history is re-counted as `temporal_weight` frames
    /// worth of samples. Zero discards it entirely; the next frame then
    /// overwrites the buffer just like the first one did.
    pub fn reset(&mut self, temporal_weight: f32, samples_per_pixel: u32) {
        self.samples_gathered = temporal_weight * samples_per_pixel as f32;
    }

    /// Write the display-ready image into `display`.
    pub fn resolve(&self, display: &mut [Vec3]) {
        for (out, linear) in display.iter_mut().zip(&self.pixels) {
            *out = linear_to_display(*linear);
        }
    }
}

/// Map a linear-light color to display space.
///
/// Clamps negatives to zero first; `powf` on a negative base is NaN.
pub fn linear_to_display(linear: Vec3) -> Vec3 {
    linear.max(Vec3::ZERO).powf(GAMMA_EXPONENT)
}

/// Quantize a display-space color to 8-bit RGBA with opaque alpha.
pub fn color_to_rgba8(color: Vec3) -> [u8; 4] {
    [
        (255.0 * color.x.clamp(0.0, 1.0)) as u8,
        (255.0 * color.y.clamp(0.0, 1.0)) as u8,
        (255.0 * color.z.clamp(0.0, 1.0)) as u8,
        255,
    ]
}
