//! Incremental scene construction.

use glimt_math::Vec3;

use crate::tables::{
    Dielectric, Lambertian, MaterialRef, Metal, Object, Scene, SceneResult, ShapeRef, Sphere,
};

/// Builds a `Scene` one row at a time.
///
/// Material methods hand back the typed handle for the row they created, so
/// object records can only reference rows that exist. `build` runs full
/// validation anyway; a failure there means the tables were edited by hand.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diffuse material row and return its handle.
    pub fn add_lambertian(&mut self, albedo: Vec3) -> MaterialRef {
        let index = self.scene.lambertians.len() as u32;
        self.scene.lambertians.push(Lambertian { albedo });
        MaterialRef::Lambertian(index)
    }

    /// Add a metal material row and return its handle.
    pub fn add_metal(&mut self, albedo: Vec3, fuzz: f32) -> MaterialRef {
        let index = self.scene.metals.len() as u32;
        self.scene.metals.push(Metal { albedo, fuzz });
        MaterialRef::Metal(index)
    }

    /// Add a glass material row and return its handle.
    pub fn add_dielectric(&mut self, albedo: Vec3, ior: f32) -> MaterialRef {
        let index = self.scene.dielectrics.len() as u32;
        self.scene.dielectrics.push(Dielectric { albedo, ior });
        MaterialRef::Dielectric(index)
    }

    /// Add a sphere object with the given material.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: MaterialRef) {
        let index = self.scene.spheres.len() as u32;
        self.scene.spheres.push(Sphere::new(center, radius));
        self.scene.objects.push(Object {
            shape: ShapeRef::Sphere(index),
            material,
        });
    }

    /// Get the number of objects added so far.
    pub fn object_count(&self) -> usize {
        self.scene.objects.len()
    }

    /// Validate and hand over the finished scene.
    pub fn build(self) -> SceneResult<Scene> {
        self.scene.validate()?;
        Ok(self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::SceneError;

    #[test]
    fn test_builder_assembles_tables() {
        let mut builder = SceneBuilder::new();
        let gray = builder.add_lambertian(Vec3::splat(0.5));
        let mirror = builder.add_metal(Vec3::new(0.7, 0.6, 0.5), 0.0);
        let glass = builder.add_dielectric(Vec3::ONE, 1.5);

        builder.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray);
        builder.add_sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, mirror);
        builder.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass);
        assert_eq!(builder.object_count(), 3);

        let scene = builder.build().unwrap();
        assert_eq!(scene.objects.len(), 3);
        assert_eq!(scene.spheres.len(), 3);
        assert_eq!(scene.lambertians.len(), 1);
        assert_eq!(scene.metals.len(), 1);
        assert_eq!(scene.dielectrics.len(), 1);
        assert_eq!(scene.objects[1].material, mirror);
    }

    #[test]
    fn test_builder_handles_index_rows() {
        let mut builder = SceneBuilder::new();
        let a = builder.add_lambertian(Vec3::splat(0.1));
        let b = builder.add_lambertian(Vec3::splat(0.9));

        assert_eq!(a, MaterialRef::Lambertian(0));
        assert_eq!(b, MaterialRef::Lambertian(1));
    }

    #[test]
    fn test_build_validates_tampered_scene() {
        let mut builder = SceneBuilder::new();
        let gray = builder.add_lambertian(Vec3::splat(0.5));
        builder.add_sphere(Vec3::ZERO, 1.0, gray);

        // Tampering below the builder API is caught at build time
        builder.scene.objects[0].shape = ShapeRef::Mesh(0);
        let err = builder.build().unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedShape { .. }));
    }
}
