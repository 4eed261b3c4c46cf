//! Progressive refinement example.
//!
//! Renders the random sphere field over a number of accumulation frames
//! and saves the converged result as a PNG.

use anyhow::{Context, Result};
use glimt_renderer::{color_to_rgba8, CameraBasis, ProgressiveRenderer, RenderSettings, Vec3};
use glimt_scene::presets;

fn main() -> Result<()> {
    env_logger::init();

    println!("Glimt Path Tracer - Progressive Example");
    println!("=======================================");

    let width = 640u32;
    let height = 360u32;
    let frames = 16u64;

    // Build the scene
    let start = std::time::Instant::now();
    let mut scene = presets::random_spheres(42).context("building scene")?;
    let bvh = glimt_renderer::Bvh::build(&mut scene).context("building BVH")?;
    println!(
        "Scene built in {:?} ({} objects, {} BVH nodes)",
        start.elapsed(),
        scene.object_count(),
        bvh.node_count()
    );

    let basis = CameraBasis::look_at(
        Vec3::new(13.0, 2.0, 3.0), // eye
        Vec3::new(0.0, 0.0, 0.0),  // target
        Vec3::new(0.0, 1.0, 0.0),  // vup
        20.0,                      // vertical fov
        10.0,                      // focus distance
        0.6,                       // focus angle
    );

    let settings = RenderSettings {
        samples_per_pixel: 8,
        max_depth: 16,
        ..RenderSettings::default()
    };

    println!(
        "Rendering {}x{} @ {} spp over {} frames...",
        width, height, settings.samples_per_pixel, frames
    );

    let mut renderer = ProgressiveRenderer::new(basis, width, height, settings);

    let start = std::time::Instant::now();
    for frame in 0..frames {
        renderer.advance_frame(&scene, &bvh, frame);
    }
    println!(
        "Rendered in {:?} ({:.0} samples per pixel gathered)",
        start.elapsed(),
        renderer.samples_gathered()
    );

    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for color in renderer.display() {
        bytes.extend_from_slice(&color_to_rgba8(*color));
    }

    let filename = "progressive.png";
    image::save_buffer(filename, &bytes, width, height, image::ColorType::Rgba8)
        .context("saving image")?;
    println!("Saved to {}", filename);

    Ok(())
}
