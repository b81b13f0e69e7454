//! Linear motion applied to another object, for motion blur.

use caustic_math::{Ray, Vec3};

use crate::{Hit, Object};

/// An object moving with constant velocity across the shutter interval.
///
/// At ray time `t` the object sits at its rest position plus
/// `velocity * t`, with `t` in `[-1, 1]`. The ray is moved the other way
/// instead, so the wrapped object is tested in its rest frame.
#[derive(Debug, Clone)]
pub struct Velocity {
    velocity: Vec3,
    object: Box<Object>,
}

impl Velocity {
    pub fn new(velocity: Vec3, object: Object) -> Self {
        Self {
            velocity,
            object: Box::new(object),
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let moved = Ray {
            origin: ray.origin - self.velocity * ray.time,
            ..*ray
        };
        self.object.intersect(&moved, hit, tmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Material, Sphere};
    use std::sync::Arc;

    fn moving_sphere() -> Velocity {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            1.0,
            Arc::new(Material::phong(Color::ONE, Color::ZERO, 1.0, 0.0)),
        );
        Velocity::new(Vec3::new(2.0, 0.0, 0.0), sphere.into())
    }

    #[test]
    fn test_rest_position_at_time_zero() {
        let object = moving_sphere();
        let mut hit = Hit::default();
        assert!(object.intersect(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut hit, 0.01));
        assert!((hit.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_position_follows_ray_time() {
        let object = moving_sphere();
        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z);

        // Sphere is centred at x = 2 when t = 1 and at x = -2 when t = -1
        let mut hit = Hit::default();
        assert!(object.intersect(&ray.with_time(1.0), &mut hit, 0.01));
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);

        let mut hit = Hit::default();
        assert!(!object.intersect(&ray.with_time(-1.0), &mut hit, 0.01));
        assert!(!object.intersect(&ray, &mut hit, 0.01));
    }

    #[test]
    fn test_material_seen_through_wrapper() {
        let object: Object = moving_sphere().into();
        assert_eq!(object.material().kind(), crate::MaterialKind::Phong);
        assert!(object.has_motion());
    }
}
