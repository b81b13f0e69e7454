//! Sphere primitive.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use caustic_math::{Ray, Vec2, Vec3};

use crate::{Hit, Material};

/// Quarter discriminants below this count as a single tangent root.
const TANGENT_EPSILON: f32 = 1e-20;

/// Nearest root of the ray/sphere quadratic inside the open window
/// `(tmin, tmax)`.
///
/// Both the tangent case and the two-root case test against the same
/// window; of two valid roots the nearer wins.
pub(crate) fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32, tmin: f32, tmax: f32) -> Option<f32> {
    // a t^2 + 2 b t + c = 0
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;

    let quarter_discriminant = b * b - a * c;
    if quarter_discriminant < 0.0 {
        return None;
    }

    let in_window = |t: f32| t > tmin && t < tmax;

    if quarter_discriminant < TANGENT_EPSILON {
        let t = -b / a;
        return in_window(t).then_some(t);
    }

    let sqrt_d = quarter_discriminant.sqrt();
    let t1 = (-b - sqrt_d) / a;
    let t2 = (-b + sqrt_d) / a;
    [t1, t2].into_iter().find(|&t| in_window(t))
}

/// Longitude/latitude coordinate of a point on the unit sphere.
///
/// Longitude is measured around the z axis from +x, latitude runs from 0 at
/// the south pole to 1 at the north pole.
fn spherical_coord(normal: Vec3) -> Vec2 {
    let phi = normal.y.atan2(normal.x).rem_euclid(TAU);
    let theta = normal.z.clamp(-1.0, 1.0).asin();
    Vec2::new(phi / TAU, (theta / FRAC_PI_2 + 1.0) / 2.0)
}

/// A sphere with an outward-facing normal.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let Some(t) = intersect_sphere(ray, self.center, self.radius, tmin, hit.t) else {
            return false;
        };

        let normal = (ray.at(t) - self.center).normalize_or_zero();
        hit.set(t, &self.material, normal);
        if self.material.has_texture() {
            hit.set_tex_coord(spherical_coord(normal));
        }
        true
    }
}
