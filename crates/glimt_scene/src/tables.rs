//! Flat scene data tables.
//!
//! The scene is plain data: one table of objects plus one table per shape
//! and material kind. Objects reference table rows through small tagged
//! handles, so renderer dispatch is an exhaustive match over closed enums
//! instead of pointer chasing, and the tables stay flat and upload-ready.

use bytemuck::{Pod, Zeroable};
use glimt_math::{Aabb, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors found while validating a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Object {object} references unimplemented shape kind '{kind}'")]
    UnsupportedShape { object: usize, kind: &'static str },

    #[error("Object {object} references {kind} {index}, but only {len} exist")]
    ShapeIndexOutOfBounds {
        object: usize,
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("Object {object} references {kind} material {index}, but only {len} exist")]
    MaterialIndexOutOfBounds {
        object: usize,
        kind: &'static str,
        index: u32,
        len: usize,
    },
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Typed handle to a row in one of the shape tables.
///
/// `Plane`, `Box`, `Cylinder` and `Mesh` are declared for the intended
/// surface but have no table yet. Scenes using them fail validation;
/// the renderer skips them defensively if one slips through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeRef {
    Sphere(u32),
    Plane(u32),
    Box(u32),
    Cylinder(u32),
    Mesh(u32),
}

impl ShapeRef {
    /// Human-readable kind name for log and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ShapeRef::Sphere(_) => "sphere",
            ShapeRef::Plane(_) => "plane",
            ShapeRef::Box(_) => "box",
            ShapeRef::Cylinder(_) => "cylinder",
            ShapeRef::Mesh(_) => "mesh",
        }
    }
}

/// Typed handle to a row in one of the material tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialRef {
    Lambertian(u32),
    Metal(u32),
    Dielectric(u32),
}

impl MaterialRef {
    /// Human-readable kind name for log and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MaterialRef::Lambertian(_) => "lambertian",
            MaterialRef::Metal(_) => "metal",
            MaterialRef::Dielectric(_) => "dielectric",
        }
    }
}

/// A renderable object: one shape paired with one material.
///
/// The BVH build reorders the object table in place; records themselves are
/// never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub shape: ShapeRef,
    pub material: MaterialRef,
}

/// Sphere geometry record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Sphere {
    /// Sphere center in world space
    pub center: Vec3,

    /// Sphere radius
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere record.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Axis-aligned bounds, center +/- radius on every axis.
    pub fn bounds(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }
}

/// Diffuse material record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Lambertian {
    /// Surface color, applied to the path throughput on every bounce
    pub albedo: Vec3,
}

/// Polished or brushed metal material record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Metal {
    /// Reflection tint
    pub albedo: Vec3,

    /// Reflection cone radius; 0 is a perfect mirror
    pub fuzz: f32,
}

/// Transmissive glass material record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Dielectric {
    /// Tint applied per interaction, usually near white
    pub albedo: Vec3,

    /// Index of refraction, e.g. 1.5 for glass
    pub ior: f32,
}

/// A complete scene as flat tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Renderable objects; reordered in place by the BVH build
    pub objects: Vec<Object>,

    /// Sphere geometry rows
    pub spheres: Vec<Sphere>,

    /// Diffuse material rows
    pub lambertians: Vec<Lambertian>,

    /// Metal material rows
    pub metals: Vec<Metal>,

    /// Glass material rows
    pub dielectrics: Vec<Dielectric>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total object count.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Check every object handle against the tables.
    ///
    /// Returns the first problem found. A scene that passes can be rendered
    /// without any handle lookup failing.
    pub fn validate(&self) -> SceneResult<()> {
        for (i, object) in self.objects.iter().enumerate() {
            match object.shape {
                ShapeRef::Sphere(index) => {
                    if index as usize >= self.spheres.len() {
                        return Err(SceneError::ShapeIndexOutOfBounds {
                            object: i,
                            kind: object.shape.kind_name(),
                            index,
                            len: self.spheres.len(),
                        });
                    }
                }
                other => {
                    return Err(SceneError::UnsupportedShape {
                        object: i,
                        kind: other.kind_name(),
                    });
                }
            }

            let (index, len) = match object.material {
                MaterialRef::Lambertian(index) => (index, self.lambertians.len()),
                MaterialRef::Metal(index) => (index, self.metals.len()),
                MaterialRef::Dielectric(index) => (index, self.dielectrics.len()),
            };
            if index as usize >= len {
                return Err(SceneError::MaterialIndexOutOfBounds {
                    object: i,
                    kind: object.material.kind_name(),
                    index,
                    len,
                });
            }
        }
        Ok(())
    }
}
