//! Errors raised while assembling scenes and rendering.

use std::path::PathBuf;

use caustic_core::{MeshError, TextureError};
use thiserror::Error;

use crate::bvh::BvhError;

/// Errors raised while building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("transform matrix is singular (determinant {determinant})")]
    SingularTransform { determinant: f32 },

    #[error("failed to build mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("failed to build BVH: {0}")]
    Bvh(#[from] BvhError),

    #[error("failed to load texture: {0}")]
    Texture(#[from] TextureError),
}

/// Errors raised by configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised while rendering or writing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
