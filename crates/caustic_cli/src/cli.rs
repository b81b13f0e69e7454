use std::path::PathBuf;

use caustic_renderer::RenderConfig;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "caustic")]
#[command(about = "Render a scene with the caustic ray tracer")]
pub struct Args {
    /// Built-in scene name (`glass`, `materials`, `motion`) or path to an OBJ file
    #[arg(default_value = "glass")]
    pub scene: String,

    /// JSON render config; command line overrides win over its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = "caustic.png")]
    pub output: PathBuf,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel for stochastic or jittered renders
    #[arg(short, long)]
    pub samples: Option<u32>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Jitter camera rays within each pixel
    #[arg(long)]
    pub jitter: bool,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of `config`.
    pub fn apply_overrides(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.jitter |= self.jitter;
        config
    }
}
