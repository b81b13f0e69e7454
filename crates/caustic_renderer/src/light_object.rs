//! Emissive primitives: geometry that can be hit and sampled as a light.

use caustic_math::{Ray, Vec3};
use rand::RngCore;

use crate::light::Illumination;
use crate::sampling::{gen_f32, random_unit_vector};
use crate::sphere::intersect_sphere;
use crate::triangle::intersect_triangle;
use crate::{Color, Hit};

/// Shape of an emissive primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum LightShape {
    Sphere { center: Vec3, radius: f32 },
    Triangle { vertices: [Vec3; 3] },
}

impl LightShape {
    /// Random point on or in the shape.
    fn sample_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        match *self {
            LightShape::Sphere { center, radius } => {
                let dir = random_unit_vector(rng);
                center + (radius * gen_f32(rng)) * dir
            }
            LightShape::Triangle { vertices: [a, b, c] } => {
                let mut r1 = gen_f32(rng);
                let mut r2 = gen_f32(rng);
                // Fold the unit square onto the triangle
                if r1 + r2 > 1.0 {
                    (r1, r2) = (1.0 - r2, 1.0 - r1);
                }
                a + r1 * (b - a) + r2 * (c - a)
            }
        }
    }
}

/// An emissive primitive with a colour, a falloff and a unique id.
#[derive(Debug, Clone, PartialEq)]
pub struct LightObject {
    id: usize,
    color: Color,
    falloff: f32,
    shape: LightShape,
}

impl LightObject {
    pub fn new(id: usize, shape: LightShape, color: Color, falloff: f32) -> Self {
        Self {
            id,
            color,
            falloff,
            shape,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Emitted colour seen when a ray hits the primitive directly.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Intersect the primitive. A hit records only the distance and the
    /// light; the normal is left untouched.
    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let t = match self.shape {
            LightShape::Sphere { center, radius } => intersect_sphere(ray, center, radius, tmin, hit.t),
            LightShape::Triangle { ref vertices } => {
                intersect_triangle(ray, vertices, tmin, hit.t).map(|bary| bary.t)
            }
        };

        match t {
            Some(t) => {
                hit.set_light(t, self);
                true
            }
            None => false,
        }
    }

    /// Light arriving at `p` from a random point of the primitive.
    pub fn sample_illumination(&self, p: Vec3, rng: &mut dyn RngCore) -> Illumination {
        let sample = self.shape.sample_point(rng);
        Illumination::toward(p, sample, self.color, self.falloff)
    }
}

/// The collection of emissive primitives in a scene.
///
/// Ids are assigned in insertion order, so they are unique within a group.
#[derive(Debug, Clone, Default)]
pub struct LightGroup {
    objects: Vec<LightObject>,
}

impl LightGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an emissive primitive and return its id.
    pub fn add(&mut self, shape: LightShape, color: Color, falloff: f32) -> usize {
        let id = self.objects.len();
        self.objects.push(LightObject::new(id, shape, color, falloff));
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightObject> {
        self.objects.iter()
    }

    pub fn get(&self, id: usize) -> Option<&LightObject> {
        self.objects.get(id)
    }

    /// Nearest emissive hit over every member.
    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let mut hit_anything = false;
        for object in &self.objects {
            hit_anything |= object.intersect(ray, hit, tmin);
        }
        hit_anything
    }
}
