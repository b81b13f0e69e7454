//! Analytic lights.

use caustic_math::Vec3;

use crate::Color;

/// Direction, colour and distance of light arriving at a shading point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Illumination {
    /// Unit direction from the shading point toward the light
    pub dir_to_light: Vec3,
    /// Light colour after falloff
    pub color: Color,
    /// Distance to the light; `f32::MAX` for directional lights
    pub distance: f32,
}

impl Illumination {
    /// Light from `source` as seen at `p`, attenuated by
    /// `1 / (1 + falloff * d^2)`.
    pub(crate) fn toward(p: Vec3, source: Vec3, color: Color, falloff: f32) -> Self {
        let offset = source - p;
        let distance = offset.length();
        let dir_to_light = if distance > 0.0 { offset / distance } else { Vec3::ZERO };
        Self {
            dir_to_light,
            color: color / (1.0 + falloff * distance * distance),
            distance,
        }
    }
}

/// A light without geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Parallel light travelling along `direction`, infinitely far away
    Directional { direction: Vec3, color: Color },
    /// Light at a position with distance falloff
    Point {
        position: Vec3,
        color: Color,
        falloff: f32,
    },
}

impl Light {
    pub fn directional(direction: Vec3, color: Color) -> Self {
        Light::Directional {
            direction: direction.normalize_or_zero(),
            color,
        }
    }

    pub fn point(position: Vec3, color: Color, falloff: f32) -> Self {
        Light::Point {
            position,
            color,
            falloff,
        }
    }

    /// Illumination arriving at `p`.
    pub fn illumination(&self, p: Vec3) -> Illumination {
        match *self {
            Light::Directional { direction, color } => Illumination {
                dir_to_light: -direction,
                color,
                distance: f32::MAX,
            },
            Light::Point {
                position,
                color,
                falloff,
            } => Illumination::toward(p, position, color, falloff),
        }
    }
}
