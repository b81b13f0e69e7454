//! Scene description consumed by the tracer.

use crate::{Color, Group, Light, LightGroup};

/// Everything the tracer needs to shade rays.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    background: Color,
    ambient_light: Color,
    lights: Vec<Light>,
    group: Group,
    light_group: LightGroup,
}

impl Scene {
    pub fn new(background: Color, ambient_light: Color) -> Self {
        Self {
            background,
            ambient_light,
            ..Self::default()
        }
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn ambient_light(&self) -> Color {
        self.ambient_light
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut Group {
        &mut self.group
    }

    pub fn light_group(&self) -> &LightGroup {
        &self.light_group
    }

    pub fn light_group_mut(&mut self) -> &mut LightGroup {
        &mut self.light_group
    }

    pub fn num_objects(&self) -> usize {
        self.group.len()
    }

    pub fn num_lights(&self) -> usize {
        self.lights.len()
    }

    pub fn num_light_objects(&self) -> usize {
        self.light_group.len()
    }

    /// True when some object moves during the shutter.
    pub fn has_motion(&self) -> bool {
        self.group.has_motion()
    }

    /// True when a pixel needs several samples to converge: the scene has
    /// emissive primitives, materials with random bounces or moving objects.
    pub fn is_stochastic(&self) -> bool {
        !self.light_group.is_empty() || self.group.has_stochastic_material() || self.has_motion()
    }
}
