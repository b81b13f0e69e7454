//! Scene geometry: the closed set of intersectable objects and the group
//! that holds them.

use caustic_math::Ray;

use crate::{Hit, Material, MeshObject, Plane, Sphere, Transform, Triangle, Velocity};

/// Any object that can be placed in a [`Group`].
#[derive(Debug, Clone)]
pub enum Object {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Mesh(MeshObject),
    Transform(Transform),
    Velocity(Velocity),
}

impl Object {
    /// Update `hit` if this object has an intersection in `(tmin, hit.t)`.
    ///
    /// Returns true when the record was updated.
    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        match self {
            Object::Sphere(sphere) => sphere.intersect(ray, hit, tmin),
            Object::Plane(plane) => plane.intersect(ray, hit, tmin),
            Object::Triangle(triangle) => triangle.intersect(ray, hit, tmin),
            Object::Mesh(mesh) => mesh.intersect(ray, hit, tmin),
            Object::Transform(transform) => transform.intersect(ray, hit, tmin),
            Object::Velocity(velocity) => velocity.intersect(ray, hit, tmin),
        }
    }

    /// Material of the object, looking through wrappers.
    pub fn material(&self) -> &Material {
        match self {
            Object::Sphere(sphere) => sphere.material(),
            Object::Plane(plane) => plane.material(),
            Object::Triangle(triangle) => triangle.material(),
            Object::Mesh(mesh) => mesh.material(),
            Object::Transform(transform) => transform.object().material(),
            Object::Velocity(velocity) => velocity.object().material(),
        }
    }

    /// True when the object, or anything it wraps, moves during the shutter.
    pub fn has_motion(&self) -> bool {
        match self {
            Object::Velocity(_) => true,
            Object::Transform(transform) => transform.object().has_motion(),
            _ => false,
        }
    }
}

impl From<Sphere> for Object {
    fn from(sphere: Sphere) -> Self {
        Object::Sphere(sphere)
    }
}

impl From<Plane> for Object {
    fn from(plane: Plane) -> Self {
        Object::Plane(plane)
    }
}

impl From<Triangle> for Object {
    fn from(triangle: Triangle) -> Self {
        Object::Triangle(triangle)
    }
}

impl From<MeshObject> for Object {
    fn from(mesh: MeshObject) -> Self {
        Object::Mesh(mesh)
    }
}

impl From<Transform> for Object {
    fn from(transform: Transform) -> Self {
        Object::Transform(transform)
    }
}

impl From<Velocity> for Object {
    fn from(velocity: Velocity) -> Self {
        Object::Velocity(velocity)
    }
}

/// The ordinary (non-emissive) geometry of a scene.
#[derive(Debug, Clone, Default)]
pub struct Group {
    objects: Vec<Object>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: impl Into<Object>) {
        self.objects.push(object.into());
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    /// Nearest hit over every member.
    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let mut hit_anything = false;
        for object in &self.objects {
            hit_anything |= object.intersect(ray, hit, tmin);
        }
        hit_anything
    }

    /// True when any member's material needs random samples to shade.
    pub fn has_stochastic_material(&self) -> bool {
        self.objects.iter().any(|o| o.material().is_stochastic())
    }

    /// True when any member moves during the shutter.
    pub fn has_motion(&self) -> bool {
        self.objects.iter().any(Object::has_motion)
    }
}
