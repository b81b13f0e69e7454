//! Nearest-hit record shared by every intersection routine.

use caustic_math::{Vec2, Vec3};

use crate::{LightObject, Material};

/// What a hit landed on.
#[derive(Debug, Clone, Copy, Default)]
pub enum Surface<'a> {
    /// Nothing yet
    #[default]
    None,
    /// Ordinary geometry with a shading material
    Material(&'a Material),
    /// An emissive light primitive
    Light(&'a LightObject),
}

/// Record of the nearest ray intersection found so far.
///
/// `t` starts at infinity and only ever shrinks: a primitive writes the
/// record only when its hit is closer than the current `t`.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Surface normal at the intersection
    pub normal: Vec3,
    /// Texture coordinate, when the surface provides one
    pub tex_coord: Option<Vec2>,
    pub surface: Surface<'a>,
}

impl Default for Hit<'_> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            normal: Vec3::ZERO,
            tex_coord: None,
            surface: Surface::None,
        }
    }
}

impl<'a> Hit<'a> {
    /// Record a hit on shaded geometry.
    #[inline]
    pub fn set(&mut self, t: f32, material: &'a Material, normal: Vec3) {
        self.t = t;
        self.normal = normal;
        self.tex_coord = None;
        self.surface = Surface::Material(material);
    }

    /// Record a hit on an emissive primitive.
    #[inline]
    pub fn set_light(&mut self, t: f32, light: &'a LightObject) {
        self.t = t;
        self.tex_coord = None;
        self.surface = Surface::Light(light);
    }

    #[inline]
    pub fn set_tex_coord(&mut self, coord: Vec2) {
        self.tex_coord = Some(coord);
    }

    /// True once any surface has been recorded.
    pub fn is_hit(&self) -> bool {
        !matches!(self.surface, Surface::None)
    }

    pub fn material(&self) -> Option<&'a Material> {
        match self.surface {
            Surface::Material(m) => Some(m),
            _ => None,
        }
    }

    pub fn light_object(&self) -> Option<&'a LightObject> {
        match self.surface {
            Surface::Light(l) => Some(l),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, LightShape};

    #[test]
    fn test_default_hit_is_empty() {
        let hit = Hit::default();
        assert!(hit.t.is_infinite());
        assert!(!hit.is_hit());
        assert!(hit.material().is_none());
    }

    #[test]
    fn test_set_switches_surface() {
        let material = Material::mirror();
        let light = LightObject::new(
            0,
            LightShape::Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
            },
            Color::ONE,
            0.0,
        );

        let mut hit = Hit::default();
        hit.set(2.0, &material, Vec3::Y);
        hit.set_tex_coord(Vec2::new(0.5, 0.5));
        assert!(hit.material().is_some());
        assert!(hit.tex_coord.is_some());

        hit.set_light(1.0, &light);
        assert_eq!(hit.t, 1.0);
        assert!(hit.material().is_none());
        assert_eq!(hit.light_object().map(|l| l.id()), Some(0));
        assert!(hit.tex_coord.is_none());
    }
}
