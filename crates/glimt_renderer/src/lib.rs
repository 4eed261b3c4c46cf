//! Progressive Monte Carlo path tracer over flat scene tables.
//!
//! The pipeline: a SAH-built bounding volume hierarchy ([`bvh`]) feeds an
//! iterative, stack-based traversal ([`intersect`]); paths bounce through
//! diffuse, metal, and glass surfaces ([`material`]) under an explicit
//! scatter budget ([`integrator`]); frames render in parallel buckets
//! ([`bucket`], [`renderer`]) and refine over time through weighted
//! temporal accumulation ([`accum`]).
//!
//! Randomness is counter-based per pixel ([`rng`]), so identical seeds
//! give bitwise identical frames no matter how the work is scheduled.

pub mod accum;
pub mod bucket;
pub mod bvh;
pub mod camera;
pub mod integrator;
pub mod intersect;
pub mod material;
pub mod renderer;
pub mod rng;

pub use accum::{color_to_rgba8, linear_to_display, Accumulator};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhError, BvhNode, BvhResult};
pub use camera::{Camera, CameraBasis};
pub use integrator::{render_pixel, sky_gradient, trace_ray};
pub use intersect::{intersect_scene, intersect_scene_linear, sphere_hit, Hit};
pub use material::{scatter, Scatter};
pub use renderer::{render_frame, ProgressiveRenderer, RenderSettings};
pub use rng::{gen_f32, pixel_rng, random_in_unit_disk, random_unit_vector};

/// Re-export common math types from glimt_math
pub use glimt_math::{Aabb, Interval, Ray, Vec3};
