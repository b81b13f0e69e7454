//! Triangle primitive and the barycentric solve shared with meshes and
//! light triangles.

use std::sync::Arc;

use caustic_math::{Mat3, Ray, Vec2, Vec3};

use crate::{Hit, Material};

/// Determinants below this magnitude make the barycentric system singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// Barycentric weights and distance of a ray/triangle intersection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Barycentric {
    pub t: f32,
    /// Weights of corners a, b and c
    pub weights: Vec3,
}

impl Barycentric {
    /// Blend three per-corner values with the barycentric weights.
    #[inline]
    pub fn interpolate<T>(&self, corners: [T; 3]) -> T
    where
        T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        let [a, b, c] = corners;
        a * self.weights.x + b * self.weights.y + c * self.weights.z
    }
}

/// Intersect a ray with triangle `[a, b, c]` inside the open window
/// `(tmin, tmax)`.
///
/// Solves `[a-b, a-c, d] * (beta, gamma, t) = a - o`. A singular system or a
/// point outside the triangle is a miss.
pub(crate) fn intersect_triangle(ray: &Ray, corners: &[Vec3; 3], tmin: f32, tmax: f32) -> Option<Barycentric> {
    let [a, b, c] = *corners;
    let m = Mat3::from_cols(a - b, a - c, ray.direction);
    if m.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }

    let x = m.inverse() * (a - ray.origin);
    let (beta, gamma, t) = (x.x, x.y, x.z);
    let alpha = 1.0 - beta - gamma;

    if alpha >= 0.0 && beta >= 0.0 && gamma >= 0.0 && t > tmin && t < tmax {
        Some(Barycentric {
            t,
            weights: Vec3::new(alpha, beta, gamma),
        })
    } else {
        None
    }
}

/// A standalone triangle with per-corner normals and optional texture
/// coordinates.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vec3; 3],
    normals: [Vec3; 3],
    tex_coords: Option<[Vec2; 3]>,
    material: Arc<Material>,
}

impl Triangle {
    /// Create a flat-shaded triangle. The normal follows the winding
    /// `(b - a) x (c - a)`.
    pub fn new(vertices: [Vec3; 3], material: Arc<Material>) -> Self {
        let [a, b, c] = vertices;
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            vertices,
            normals: [normal; 3],
            tex_coords: None,
            material,
        }
    }

    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_tex_coords(mut self, tex_coords: [Vec2; 3]) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let Some(bary) = intersect_triangle(ray, &self.vertices, tmin, hit.t) else {
            return false;
        };

        let normal = bary.interpolate(self.normals).normalize_or_zero();
        hit.set(bary.t, &self.material, normal);
        if let Some(tex) = self.tex_coords {
            hit.set_tex_coord(bary.interpolate(tex));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            Arc::new(Material::phong(Color::ONE, Color::ZERO, 1.0, 0.0)),
        )
    }

    #[test]
    fn test_hit_inside() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 2.0), -Vec3::Z);

        let mut hit = Hit::default();
        assert!(tri.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t - 2.0).abs() < 1e-6);
        assert!((hit.normal - Vec3::Z).length() < 1e-6);
        assert!(hit.tex_coord.is_none());
    }

    #[test]
    fn test_miss_outside() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.8, 0.8, 2.0), -Vec3::Z);
        let mut hit = Hit::default();
        assert!(!tri.intersect(&ray, &mut hit, 0.0));
        assert!(hit.t.is_infinite());
    }

    #[test]
    fn test_parallel_ray_is_singular() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(-1.0, 0.25, 0.0), Vec3::X);
        let mut hit = Hit::default();
        assert!(!tri.intersect(&ray, &mut hit, 0.0));
    }

    #[test]
    fn test_respects_window() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 2.0), -Vec3::Z);

        // Farther than the current hit
        let mut hit = Hit::default();
        hit.t = 1.0;
        assert!(!tri.intersect(&ray, &mut hit, 0.0));

        // Closer than the bias
        let mut hit = Hit::default();
        assert!(!tri.intersect(&ray, &mut hit, 3.0));
    }

    #[test]
    fn test_interpolated_normal_and_tex_coord() {
        let tri = unit_triangle()
            .with_normals([Vec3::Z, Vec3::X, Vec3::Y])
            .with_tex_coords([Vec2::ZERO, Vec2::X, Vec2::Y]);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), -Vec3::Z);

        let mut hit = Hit::default();
        assert!(tri.intersect(&ray, &mut hit, 0.0));

        // Halfway along edge a-b
        let expected = (Vec3::Z + Vec3::X).normalize();
        assert!((hit.normal - expected).length() < 1e-5);
        let uv = hit.tex_coord.unwrap();
        assert!((uv - Vec2::new(0.5, 0.0)).length() < 1e-5);
    }
}
