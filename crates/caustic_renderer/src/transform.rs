//! Affine transform applied to another object.

use caustic_math::{Mat3, Mat4, Ray};

use crate::{Hit, Object, SceneError};

/// Determinants below this magnitude are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// An object placed in the scene through a 4x4 matrix.
///
/// Rays are mapped into the object's space with the inverse matrix and their
/// direction normalised; distances are scaled back by the length of the
/// mapped direction.
#[derive(Debug, Clone)]
pub struct Transform {
    inverse: Mat4,
    /// Inverse transpose of the upper 3x3, for normals
    normal_matrix: Mat3,
    object: Box<Object>,
}

impl Transform {
    pub fn new(matrix: Mat4, object: Object) -> Result<Self, SceneError> {
        let det = matrix.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return Err(SceneError::SingularTransform { determinant: det });
        }

        let inverse = matrix.inverse();
        Ok(Self {
            inverse,
            normal_matrix: Mat3::from_mat4(inverse).transpose(),
            object: Box::new(object),
        })
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let direction = self.inverse.transform_vector3(ray.direction);
        let len = direction.length();
        if len == 0.0 {
            return false;
        }

        let local_ray = Ray::new(self.inverse.transform_point3(ray.origin), direction / len).with_time(ray.time);

        // Local distances are `len` times the world ones
        let mut local_hit = Hit {
            t: hit.t * len,
            ..Hit::default()
        };
        if !self.object.intersect(&local_ray, &mut local_hit, tmin * len) {
            return false;
        }

        let t = local_hit.t / len;
        if t >= hit.t {
            return false;
        }

        hit.t = t;
        hit.normal = (self.normal_matrix * local_hit.normal).normalize_or_zero();
        hit.tex_coord = local_hit.tex_coord;
        hit.surface = local_hit.surface;
        true
    }
}
