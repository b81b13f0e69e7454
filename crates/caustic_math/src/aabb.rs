use crate::{Ray, Vec3};
use thiserror::Error;

/// Direction components at or below this magnitude are treated as parallel
/// to the slab.
const PARALLEL_EPSILON: f32 = 1e-20;

/// Initial bound of the slab interval.
const SLAB_LIMIT: f32 = 1e30;

/// Errors raised when constructing a bounding box.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("invalid bounds: lower {lower} exceeds upper {upper} on axis {axis}")]
    Inverted { lower: Vec3, upper: Vec3, axis: usize },

    #[error("invalid bounds: non-finite corner (lower {lower}, upper {upper})")]
    NonFinite { lower: Vec3, upper: Vec3 },
}

/// Axis-aligned bounding box used by the mesh BVH.
///
/// `lower <= upper` holds component-wise for every box built through
/// [`Aabb::new`] or [`Aabb::from_points`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    lower: Vec3,
    upper: Vec3,
}

impl Aabb {
    /// Create a box from its two corners, validating their order.
    pub fn new(lower: Vec3, upper: Vec3) -> Result<Self, BoundsError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(BoundsError::NonFinite { lower, upper });
        }
        for axis in 0..3 {
            if lower[axis] > upper[axis] {
                return Err(BoundsError::Inverted { lower, upper, axis });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Create the tight box around a set of points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Result<Self, BoundsError>>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter().peekable();
        points.peek()?;

        // min/max skip NaN, so every point is checked on its own
        let bounds = points.try_fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |(lo, hi), p| {
            if p.is_finite() {
                Ok((lo.min(p), hi.max(p)))
            } else {
                Err(BoundsError::NonFinite { lower: p, upper: p })
            }
        });
        Some(bounds.and_then(|(lower, upper)| Self::new(lower, upper)))
    }

    /// Create the box surrounding two other boxes.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            lower: a.lower.min(b.lower),
            upper: a.upper.max(b.upper),
        }
    }

    /// Lower corner.
    #[inline]
    pub fn lower(&self) -> Vec3 {
        self.lower
    }

    /// Upper corner.
    #[inline]
    pub fn upper(&self) -> Vec3 {
        self.upper
    }

    /// Extent along each axis (width, length, height).
    pub fn size(&self) -> Vec3 {
        self.upper - self.lower
    }

    /// Midpoint of the box along one axis (0=X, 1=Y, 2=Z).
    pub fn mid(&self, axis: usize) -> f32 {
        (self.lower[axis] + self.upper[axis]) * 0.5
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.lower + self.upper) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties go to the lower axis.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        let mut axis = 0;
        if size.y > size[axis] {
            axis = 1;
        }
        if size.z > size[axis] {
            axis = 2;
        }
        axis
    }

    /// Slab test against a ray.
    ///
    /// Returns the entry and exit distances `(t_near, t_far)` along the ray,
    /// which may be negative when the box lies behind or around the origin.
    /// An axis the ray runs parallel to is a miss if the origin sits outside
    /// that slab. A ray parallel to every axis (zero direction) never hits.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_near = -SLAB_LIMIT;
        let mut t_far = SLAB_LIMIT;
        let mut parallel = true;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() > PARALLEL_EPSILON {
                parallel = false;
                let mut t1 = (self.lower[axis] - origin) / direction;
                let mut t2 = (self.upper[axis] - origin) / direction;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_near = t_near.max(t1);
                t_far = t_far.min(t2);
            } else if origin < self.lower[axis] || origin > self.upper[axis] {
                return None;
            }
        }

        // Equal bounds still hit: planar meshes have zero-thickness boxes
        if parallel || t_far < t_near {
            None
        } else {
            Some((t_near, t_far))
        }
    }
}
