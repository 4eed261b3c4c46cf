//! Frame rendering and the progressive refinement driver.
//!
//! [`render_frame`] produces one complete linear-light frame by fanning
//! buckets out across the rayon pool. [`ProgressiveRenderer`] owns the
//! camera, accumulation history, and display buffer, and turns a stream
//! of frames into a steadily converging image.

use std::time::Instant;

use glimt_math::Vec3;
use glimt_scene::Scene;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::accum::Accumulator;
use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::bvh::Bvh;
use crate::camera::{Camera, CameraBasis};

/// Knobs controlling per-frame rendering cost and temporal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Paths traced per pixel per frame
    pub samples_per_pixel: u32,

    /// Scatter events each path may spend before it is cut off
    pub max_depth: u32,

    /// Edge length of the render buckets in pixels
    pub bucket_size: u32,

    /// Fraction of accumulated history retained across a camera change,
    /// expressed in frames of `samples_per_pixel` samples
    pub temporal_weight: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: 4,
            max_depth: 8,
            bucket_size: DEFAULT_BUCKET_SIZE,
            temporal_weight: 0.25,
        }
    }
}

/// Render one frame and return it as a row-major linear-light image.
///
/// Buckets are rendered in parallel and composited back in one pass.
/// The output is a pure function of scene, camera, settings, and
/// `frame_seed`; thread scheduling never shows up in the pixels because
/// every pixel draws from its own counter-derived RNG stream.
pub fn render_frame(
    scene: &Scene,
    bvh: &Bvh,
    camera: &Camera,
    settings: &RenderSettings,
    frame_seed: u64,
) -> Vec<Vec3> {
    let width = camera.width();
    let height = camera.height();
    let buckets = generate_buckets(width, height, settings.bucket_size.max(1));

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            BucketResult::new(
                *bucket,
                render_bucket(bucket, scene, bvh, camera, settings, frame_seed),
            )
        })
        .collect();

    let mut frame = vec![Vec3::ZERO; (width * height) as usize];
    for result in results {
        let bucket = result.bucket;
        if result.pixels.len() != bucket.pixel_count() as usize {
            continue;
        }
        for row in 0..bucket.height {
            let src = (row * bucket.width) as usize;
            let dst = ((bucket.y + row) * width + bucket.x) as usize;
            let count = bucket.width as usize;
            frame[dst..dst + count].copy_from_slice(&result.pixels[src..src + count]);
        }
    }

    frame
}

/// Progressive path tracer with temporal accumulation.
///
/// Call [`advance_frame`](Self::advance_frame) once per display refresh.
/// Camera moves go through [`set_basis`](Self::set_basis), which ages the
/// history down instead of discarding it, so the image stays recognizable
/// while it re-converges.
#[derive(Debug)]
pub struct ProgressiveRenderer {
    camera: Camera,
    settings: RenderSettings,
    accumulator: Accumulator,
    display: Vec<Vec3>,
    frame_index: u64,
}

impl ProgressiveRenderer {
    pub fn new(basis: CameraBasis, width: u32, height: u32, settings: RenderSettings) -> Self {
        Self {
            camera: Camera::new(basis, width, height),
            settings,
            accumulator: Accumulator::new(width, height),
            display: vec![Vec3::ZERO; (width * height) as usize],
            frame_index: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Frames rendered since construction
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Effective sample count in the accumulation history
    pub fn samples_gathered(&self) -> f32 {
        self.accumulator.samples_gathered()
    }

    /// Accumulated linear-light pixels, row-major
    pub fn pixels(&self) -> &[Vec3] {
        self.accumulator.pixels()
    }

    /// Display-ready pixels from the last [`advance_frame`](Self::advance_frame)
    pub fn display(&self) -> &[Vec3] {
        &self.display
    }

    /// Move the camera.
    ///
    /// An unchanged basis is a no-op. A real move keeps the accumulated
    /// image but re-counts it as `temporal_weight` frames of history, so
    /// the next few frames dominate the blend.
    pub fn set_basis(&mut self, basis: CameraBasis) {
        if *self.camera.basis() == basis {
            return;
        }
        self.camera.set_basis(basis);
        self.accumulator
            .reset(self.settings.temporal_weight, self.settings.samples_per_pixel);
    }

    /// Resize the render target, dropping all accumulated history.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        if width == self.camera.width() && height == self.camera.height() {
            return;
        }
        self.camera.set_resolution(width, height);
        self.accumulator = Accumulator::new(width, height);
        self.display = vec![Vec3::ZERO; (width * height) as usize];
    }

    /// Render one frame, fold it into the history, and refresh the
    /// display buffer.
    ///
    /// `frame_seed` selects the sample sequence; feeding the frame index
    /// makes a run reproducible end to end.
    pub fn advance_frame(&mut self, scene: &Scene, bvh: &Bvh, frame_seed: u64) {
        let start = Instant::now();

        let frame = render_frame(scene, bvh, &self.camera, &self.settings, frame_seed);
        self.accumulator
            .blend(&frame, self.settings.samples_per_pixel.max(1));
        self.accumulator.resolve(&mut self.display);
        self.frame_index += 1;

        log::debug!(
            "frame {} rendered in {:?} ({:.0} samples gathered)",
            self.frame_index,
            start.elapsed(),
            self.accumulator.samples_gathered()
        );
    }
}
