//! Glimt scene model - flat geometry and material tables.
//!
//! This crate provides:
//!
//! - **Scene tables**: `Scene`, `Object`, `Sphere` and the material records,
//!   stored as flat vectors indexed by typed handles
//! - **Construction**: `SceneBuilder` for incremental assembly with
//!   validation at build time
//! - **Reference scenes**: seeded procedural presets for demos and tests
//!
//! # Example
//!
//! ```ignore
//! use glimt_scene::SceneBuilder;
//! use glimt_math::Vec3;
//!
//! let mut builder = SceneBuilder::new();
//! let gray = builder.add_lambertian(Vec3::splat(0.5));
//! builder.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray);
//! let scene = builder.build()?;
//! ```

pub mod builder;
pub mod presets;
pub mod tables;

// Re-export commonly used types
pub use builder::SceneBuilder;
pub use tables::{
    Dielectric, Lambertian, MaterialRef, Metal, Object, Scene, SceneError, SceneResult, ShapeRef,
    Sphere,
};
