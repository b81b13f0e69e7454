//! Parallel image renderer.
//!
//! Splits the image into buckets, traces each on the rayon pool with its own
//! seeded generator and assembles the result into an [`ImageBuffer`].

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::error::RenderError;
use crate::sampling::gen_range;
use crate::{Color, Hit, PerspectiveCamera, RenderConfig, Scene, TraceContext, Tracer};

/// Average `samples` traced rays through pixel `(x, y)`.
///
/// `y` is in camera space (0 is the bottom row). When the scene has moving
/// objects each ray gets a shutter time uniform in `[-1, 1)`. Samples that
/// come back NaN are dropped from the mean; a pixel with no valid sample is
/// black.
pub fn render_pixel(
    tracer: &Tracer,
    camera: &PerspectiveCamera,
    x: u32,
    y: u32,
    samples: u32,
    jitter: bool,
    ctx: &mut TraceContext,
) -> Color {
    let mut sum = Color::ZERO;
    let mut valid = 0u32;
    let motion = tracer.scene().has_motion();

    for _ in 0..samples {
        let mut ray = camera.sample_ray(x, y, jitter, ctx.rng());
        if motion {
            ray = ray.with_time(gen_range(ctx.rng(), -1.0, 1.0));
        }
        let mut hit = Hit::default();
        let color = tracer.trace_ray(&ray, &mut hit, ctx);
        if color.is_nan() {
            continue;
        }
        sum += color;
        valid += 1;
    }

    if valid == 0 {
        Color::ZERO
    } else {
        sum / valid as f32
    }
}

/// Convert a linear color in `[0, 1]` to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]
}

/// Rendered pixels, row-major with row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Convert to RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Write the image to disk. The format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        image::save_buffer(path, &self.to_rgba(), self.width, self.height, image::ColorType::Rgba8)
            .map_err(|source| RenderError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy)]
pub struct RenderStats {
    /// Samples traced per pixel
    pub samples_per_pixel: u32,
    pub buckets: usize,
    /// Deepest recursion level reached by any ray
    pub max_depth: usize,
    pub elapsed: Duration,
}

/// Render `scene` as seen from `camera`.
///
/// The camera is resized to the configured resolution. Deterministic scenes
/// seen through a pinhole without jitter trace one ray per pixel; otherwise
/// each pixel averages `samples_per_pixel` rays. Bucket `i` draws from a generator seeded with
/// `seed + i`, so a render is reproducible for a given config.
pub fn render(
    scene: &Scene,
    camera: &PerspectiveCamera,
    config: &RenderConfig,
) -> Result<(ImageBuffer, RenderStats), RenderError> {
    config.validate()?;
    let start = Instant::now();

    let camera = camera.clone().with_size(config.width, config.height);
    let samples = if scene.is_stochastic() || camera.is_stochastic() || config.jitter {
        config.samples_per_pixel
    } else {
        1
    };
    let tracer = Tracer::new(scene, config.tracer.clone());
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);
    let total = buckets.len();

    log::info!(
        "Rendering {}x{} with {} sample(s) per pixel in {} buckets ({} objects, {} lights, {} light objects)",
        config.width,
        config.height,
        samples,
        total,
        scene.num_objects(),
        scene.num_lights(),
        scene.num_light_objects()
    );

    let finished = AtomicUsize::new(0);
    let report_every = (total / 10).max(1);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut ctx = tracer.context_from_seed(config.seed.wrapping_add(bucket.index as u64));
            let pixels = render_bucket(bucket, &camera, &tracer, samples, config.jitter, &mut ctx);

            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            if done % report_every == 0 || done == total {
                log::info!("Rendered {done}/{total} buckets");
            }
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    let stats = RenderStats {
        samples_per_pixel: samples,
        buckets: total,
        max_depth: tracer.maximum_observed_depth(),
        elapsed: start.elapsed(),
    };
    log::debug!("Render finished: {stats:?}");
    Ok((image, stats))
}
