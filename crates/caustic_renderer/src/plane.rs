//! Infinite plane primitive.

use std::sync::Arc;

use caustic_math::{Ray, Vec3};

use crate::{Hit, Material};

/// The plane `normal . p = offset`.
///
/// The stored normal is unit length; the reported hit normal is flipped to
/// face the incoming ray.
#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vec3,
    offset: f32,
    material: Arc<Material>,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32, material: Arc<Material>) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            offset,
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let denom = self.normal.dot(ray.direction);
        if denom == 0.0 {
            return false;
        }

        let t = (self.offset - self.normal.dot(ray.origin)) / denom;
        if t <= tmin || t >= hit.t {
            return false;
        }

        let normal = if denom > 0.0 { -self.normal } else { self.normal };
        hit.set(t, &self.material, normal);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn floor() -> Plane {
        Plane::new(
            Vec3::new(0.0, 2.0, 0.0),
            -1.0,
            Arc::new(Material::phong(Color::ONE, Color::ZERO, 1.0, 0.0)),
        )
    }

    #[test]
    fn test_hit_from_above() {
        let plane = floor();
        assert_eq!(plane.normal(), Vec3::Y);
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), -Vec3::Y);
        let mut hit = Hit::default();
        assert!(plane.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t - 4.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_normal_faces_ray_from_below() {
        let plane = floor();
        let ray = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y);
        let mut hit = Hit::default();
        assert!(plane.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t - 2.0).abs() < 1e-6);
        assert_eq!(hit.normal, -Vec3::Y);
    }

    #[test]
    fn test_parallel_and_behind_miss() {
        let plane = floor();
        let mut hit = Hit::default();
        assert!(!plane.intersect(&Ray::new(Vec3::ZERO, Vec3::X), &mut hit, 0.0));
        assert!(!plane.intersect(&Ray::new(Vec3::ZERO, Vec3::Y), &mut hit, 0.0));
        assert!(!hit.is_hit());
    }
}
