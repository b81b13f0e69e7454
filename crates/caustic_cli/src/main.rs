use anyhow::{Context, Result};
use caustic_renderer::{render, RenderConfig};
use clap::Parser;
use log::info;

mod cli;
mod scenes;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    let config = args.apply_overrides(config);

    let (scene, camera) =
        scenes::load(&args.scene).with_context(|| format!("building scene '{}'", args.scene))?;
    info!(
        "Scene '{}': {} objects, {} lights, {} light objects",
        args.scene,
        scene.num_objects(),
        scene.num_lights(),
        scene.num_light_objects()
    );

    let (image, stats) = render(&scene, &camera, &config)?;
    info!(
        "Rendered in {:.2}s ({} spp, maximum recursion depth {})",
        stats.elapsed.as_secs_f64(),
        stats.samples_per_pixel,
        stats.max_depth
    );

    image.save(&args.output)?;
    Ok(())
}
