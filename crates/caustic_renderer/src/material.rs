//! Surface materials and their local shading terms.
//!
//! Materials form a closed set; the tracer matches on [`MaterialKind`] to
//! pick the indirect-lighting rule, while the local Phong-style terms below
//! are shared by every kind.

use std::sync::Arc;

use caustic_core::Texture;
use caustic_math::Vec3;

use crate::Hit;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Roughness substituted for non-positive glossy roughness.
const MIN_ROUGHNESS: f32 = 0.01;

/// Roughness of materials that do not specify one.
const DEFAULT_ROUGHNESS: f32 = 0.5;

/// How a material scatters secondary rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Local shading plus a specular-weighted reflect/refract blend
    Phong,
    /// Local shading plus one Cook-Torrance weighted random bounce
    Glossy,
    /// Perfect reflection only
    Mirror,
    /// Local shading plus one uniform random bounce
    Ambient,
    /// Fresnel blend of perfect reflection and refraction
    Glass,
}

/// A surface material.
#[derive(Debug, Clone)]
pub struct Material {
    kind: MaterialKind,
    diffuse: Color,
    specular: Color,
    shininess: f32,
    refraction_index: f32,
    roughness: f32,
    texture: Option<Arc<Texture>>,
}

impl Material {
    fn new(kind: MaterialKind, diffuse: Color) -> Self {
        Self {
            kind,
            diffuse,
            specular: Color::ZERO,
            shininess: 0.0,
            refraction_index: 0.0,
            roughness: DEFAULT_ROUGHNESS,
            texture: None,
        }
    }

    /// Classic Phong material.
    ///
    /// A positive `refraction_index` makes the secondary blend refract as
    /// well as reflect.
    pub fn phong(diffuse: Color, specular: Color, shininess: f32, refraction_index: f32) -> Self {
        Self {
            specular,
            shininess,
            refraction_index,
            ..Self::new(MaterialKind::Phong, diffuse)
        }
    }

    /// Glossy microfacet material. Non-positive roughness becomes 0.01.
    pub fn glossy(diffuse: Color, specular: Color, shininess: f32, roughness: f32) -> Self {
        Self {
            specular,
            shininess,
            roughness: if roughness <= 0.0 { MIN_ROUGHNESS } else { roughness },
            ..Self::new(MaterialKind::Glossy, diffuse)
        }
    }

    /// Diffuse material that gathers light from one random bounce.
    pub fn ambient(diffuse: Color, specular: Color, shininess: f32) -> Self {
        Self {
            specular,
            shininess,
            ..Self::new(MaterialKind::Ambient, diffuse)
        }
    }

    /// Perfect mirror.
    pub fn mirror() -> Self {
        Self::new(MaterialKind::Mirror, Color::ZERO)
    }

    /// Clear dielectric with the given index of refraction.
    pub fn glass(refraction_index: f32) -> Self {
        Self {
            refraction_index,
            ..Self::new(MaterialKind::Glass, Color::ZERO)
        }
    }

    /// Replace the diffuse colour with a texture lookup where hits carry
    /// texture coordinates.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn diffuse_color(&self) -> Color {
        self.diffuse
    }

    pub fn specular_color(&self) -> Color {
        self.specular
    }

    pub fn refraction_index(&self) -> f32 {
        self.refraction_index
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// True when shading this material consumes random samples.
    pub fn is_stochastic(&self) -> bool {
        matches!(self.kind, MaterialKind::Ambient | MaterialKind::Glossy)
    }

    /// Diffuse colour at a hit: the texture sample when both a texture and
    /// texture coordinates are present.
    fn diffuse_at(&self, hit: &Hit) -> Color {
        match (&self.texture, hit.tex_coord) {
            (Some(texture), Some(uv)) => texture.sample(uv.x, uv.y),
            _ => self.diffuse,
        }
    }

    /// Diffuse plus specular contribution of one light.
    ///
    /// `dir_to_light` must be unit length; `ray_dir` is the direction of the
    /// ray that produced `hit`.
    pub fn shade(&self, ray_dir: Vec3, hit: &Hit, dir_to_light: Vec3, light_color: Color) -> Color {
        self.shade_diffuse(hit, dir_to_light, light_color)
            + self.shade_specular(ray_dir, hit, dir_to_light, light_color)
    }

    /// Lambert term of one light.
    pub fn shade_diffuse(&self, hit: &Hit, dir_to_light: Vec3, light_color: Color) -> Color {
        let kd = self.diffuse_at(hit);
        dir_to_light.dot(hit.normal).max(0.0) * light_color * kd
    }

    /// Phong highlight of one light.
    pub fn shade_specular(&self, ray_dir: Vec3, hit: &Hit, dir_to_light: Vec3, light_color: Color) -> Color {
        let n = hit.normal;
        let reflected_light = 2.0 * dir_to_light.dot(n) * n - dir_to_light;
        let highlight = -reflected_light.dot(ray_dir);
        let highlight = if highlight < 0.0 {
            0.0
        } else {
            highlight.powf(self.shininess)
        };
        highlight * light_color * self.specular
    }

    /// Ambient term.
    pub fn shade_ambient(&self, hit: &Hit, ambient_light: Color) -> Color {
        ambient_light * self.diffuse_at(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caustic_math::Vec2;

    fn hit_with_normal<'a>(material: &'a Material, normal: Vec3) -> Hit<'a> {
        let mut hit = Hit::default();
        hit.set(1.0, material, normal);
        hit
    }

    #[test]
    fn test_glossy_roughness_floor() {
        let m = Material::glossy(Color::ONE, Color::ONE, 10.0, 0.0);
        assert_eq!(m.roughness(), 0.01);
        let m = Material::glossy(Color::ONE, Color::ONE, 10.0, -1.0);
        assert_eq!(m.roughness(), 0.01);
        let m = Material::glossy(Color::ONE, Color::ONE, 10.0, 0.3);
        assert_eq!(m.roughness(), 0.3);
    }

    #[test]
    fn test_stochastic_kinds() {
        assert!(Material::ambient(Color::ONE, Color::ZERO, 0.0).is_stochastic());
        assert!(Material::glossy(Color::ONE, Color::ZERO, 0.0, 0.5).is_stochastic());
        assert!(!Material::phong(Color::ONE, Color::ZERO, 0.0, 0.0).is_stochastic());
        assert!(!Material::mirror().is_stochastic());
        assert!(!Material::glass(1.5).is_stochastic());
    }

    #[test]
    fn test_shade_head_on() {
        let m = Material::phong(Color::new(0.5, 0.2, 0.1), Color::splat(0.2), 8.0, 0.0);
        let hit = hit_with_normal(&m, Vec3::Z);

        // Light and viewer both along the normal
        let c = m.shade(-Vec3::Z, &hit, Vec3::Z, Color::ONE);
        assert!((c - Color::new(0.7, 0.4, 0.3)).length() < 1e-6);
    }

    #[test]
    fn test_shade_light_behind_surface() {
        let m = Material::phong(Color::ONE, Color::ZERO, 1.0, 0.0);
        let hit = hit_with_normal(&m, Vec3::Z);

        let c = m.shade_diffuse(&hit, -Vec3::Z, Color::ONE);
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_specular_falls_off_with_shininess() {
        let m_soft = Material::phong(Color::ZERO, Color::ONE, 1.0, 0.0);
        let m_sharp = Material::phong(Color::ZERO, Color::ONE, 64.0, 0.0);
        let hit = hit_with_normal(&m_soft, Vec3::Z);

        let light = Vec3::new(0.3, 0.0, 1.0).normalize();
        let soft = m_soft.shade_specular(-Vec3::Z, &hit, light, Color::ONE);
        let sharp = m_sharp.shade_specular(-Vec3::Z, &hit, light, Color::ONE);
        assert!(soft.x > sharp.x);
        assert!(sharp.x > 0.0);
    }

    #[test]
    fn test_texture_replaces_diffuse() {
        let texture = Arc::new(Texture::solid_color(Color::new(0.0, 1.0, 0.0)));
        let m = Material::phong(Color::new(1.0, 0.0, 0.0), Color::ZERO, 1.0, 0.0)
            .with_texture(texture);

        let mut hit = hit_with_normal(&m, Vec3::Z);
        // No texture coordinate: plain diffuse colour
        assert_eq!(m.shade_ambient(&hit, Color::ONE), Color::new(1.0, 0.0, 0.0));

        hit.set_tex_coord(Vec2::new(0.5, 0.5));
        assert_eq!(m.shade_ambient(&hit, Color::ONE), Color::new(0.0, 1.0, 0.0));
    }
}
