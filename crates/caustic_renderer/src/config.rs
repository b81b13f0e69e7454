//! Tracer and render settings, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to name the values
//! it changes:
//!
//! ```json
//! { "width": 800, "samples_per_pixel": 64, "tracer": { "falloff": 0.1 } }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings for the recursive tracer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Minimum hit distance for secondary and shadow rays
    pub epsilon: f32,
    /// Distance falloff applied to ambient and glossy bounces
    pub falloff: f32,
    /// Depth past which no secondary rays are traced
    pub max_depth: usize,
    /// Chance of terminating a path once past `roulette_depth`
    pub stop_probability: f32,
    /// Depth past which Russian roulette applies
    pub roulette_depth: usize,
    /// Refraction index of the medium the camera sits in
    pub camera_refraction_index: f32,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            falloff: 0.25,
            max_depth: 100,
            stop_probability: 0.5,
            roulette_depth: 5,
            camera_refraction_index: 1.0,
        }
    }
}

impl TracerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(invalid("epsilon", format!("{} is not a non-negative number", self.epsilon)));
        }
        if !(self.falloff.is_finite() && self.falloff >= 0.0) {
            return Err(invalid("falloff", format!("{} is not a non-negative number", self.falloff)));
        }
        if !(0.0..=1.0).contains(&self.stop_probability) {
            return Err(invalid(
                "stop_probability",
                format!("{} is outside [0, 1]", self.stop_probability),
            ));
        }
        if !(self.camera_refraction_index.is_finite() && self.camera_refraction_index > 0.0) {
            return Err(invalid(
                "camera_refraction_index",
                format!("{} is not positive", self.camera_refraction_index),
            ));
        }
        Ok(())
    }
}

/// Settings for a whole render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for stochastic scenes or jittered rendering
    pub samples_per_pixel: u32,
    /// Jitter camera rays within each pixel
    pub jitter: bool,
    /// Edge length of the square tiles rendered in parallel
    pub bucket_size: u32,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
    pub tracer: TracerConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            samples_per_pixel: 10,
            jitter: false,
            bucket_size: 64,
            seed: 0,
            tracer: TracerConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Load and validate a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&data)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(
                "width/height",
                format!("image size {}x{} is empty", self.width, self.height),
            ));
        }
        if self.samples_per_pixel == 0 {
            return Err(invalid("samples_per_pixel", "must be at least 1".to_string()));
        }
        if self.bucket_size == 0 {
            return Err(invalid("bucket_size", "must be at least 1".to_string()));
        }
        self.tracer.validate()
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.width, 400);
        assert_eq!(config.tracer.epsilon, 0.01);
        assert_eq!(config.tracer.max_depth, 100);
        assert_eq!(config.tracer.roulette_depth, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RenderConfig::from_json_str(
            r#"{ "width": 800, "seed": 7, "tracer": { "falloff": 0.1 } }"#,
        )
        .unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 400);
        assert_eq!(config.seed, 7);
        assert_eq!(config.tracer.falloff, 0.1);
        assert_eq!(config.tracer.stop_probability, 0.5);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(RenderConfig::from_json_str("{}").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RenderConfig::from_json_str(r#"{ "width": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "width/height", .. }));

        let err = RenderConfig::from_json_str(r#"{ "tracer": { "stop_probability": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "stop_probability", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = RenderConfig::from_json_str("{ width: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RenderConfig::load("/nonexistent/caustic/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
