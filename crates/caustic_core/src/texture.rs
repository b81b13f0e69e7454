//! Image textures for diffuse colour lookup.
//!
//! Pixels are stored as RGB floats in [0, 1], converted directly from 8-bit
//! values without any colour-space transform.

use std::path::Path;

use caustic_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("pixel count {actual} does not match {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A texture with pixel data in row-major order, top row first.
#[derive(Clone, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a texture by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Vec3) -> TextureResult<Self> {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Load a texture from an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32) / 255.0)
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample the texture at texture coordinates (bilinear filtering).
    ///
    /// `(0, 0)` is the bottom-left corner and `(1, 1)` the top-right.
    /// Coordinates outside that range clamp to the edge texels.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let x = u * self.width as f32;
        let y = (1.0 - v) * self.height as f32;

        let ix = x.trunc();
        let iy = y.trunc();
        let fx = x - ix;
        let fy = y - iy;
        let (ix, iy) = (ix as i64, iy as i64);

        let p00 = self.texel(ix, iy);
        let p10 = self.texel(ix + 1, iy);
        let p01 = self.texel(ix, iy + 1);
        let p11 = self.texel(ix + 1, iy + 1);

        p00 * ((1.0 - fx) * (1.0 - fy))
            + p10 * (fx * (1.0 - fy))
            + p01 * ((1.0 - fx) * fy)
            + p11 * (fx * fy)
    }

    /// Get pixel at integer coordinates, clamped to the image.
    fn texel(&self, x: i64, y: i64) -> Vec3 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }
}
