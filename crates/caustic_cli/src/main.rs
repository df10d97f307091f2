use std::time::Instant;

use anyhow::{bail, Context, Result};
use caustic_core::load_scene;
use caustic_renderer::{render, RenderConfig, Scene};

const USAGE: &str = "usage: caustic <scene-file> <output.ppm>";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [scene_path, output_path] = args.as_slice() else {
        bail!("expected 2 arguments, got {}\n{}", args.len(), USAGE);
    };

    let start = Instant::now();
    let desc = load_scene(scene_path).with_context(|| format!("failed to load scene {scene_path}"))?;
    log::info!(
        "Parsed {}x{} scene with {} objects ({} planes, {} lights) in {:.2?}",
        desc.width,
        desc.height,
        desc.objects.len(),
        desc.plane_count(),
        desc.light_count(),
        start.elapsed()
    );

    let start = Instant::now();
    let scene = Scene::from_description(&desc).context("failed to build scene")?;
    log::info!("Built acceleration structures in {:.2?}", start.elapsed());

    let config = RenderConfig::from_description(&desc);
    let image = render(&scene, &config);

    let start = Instant::now();
    image
        .save_ppm(output_path)
        .with_context(|| format!("failed to write image {output_path}"))?;
    log::info!("Saved {} in {:.2?}", output_path, start.elapsed());

    Ok(())
}
