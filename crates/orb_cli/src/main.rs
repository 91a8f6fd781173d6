use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orb_core::{RenderMode, SceneDescription};
use orb_renderer::{
    build_camera, build_pathtracing_scene, build_scene, render, render_pathtraced, PathtraceOptions,
    RaytraceOptions,
};

#[derive(Parser)]
#[command(name = "orb")]
#[command(about = "Render a sphere scene description to an image", long_about = None)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Override the render mode from the scene file
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Override the image width
    #[arg(long)]
    width: Option<u32>,

    /// Override the image height
    #[arg(long)]
    height: Option<u32>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Raytrace,
    Pathtrace,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Raytrace => RenderMode::Raytrace,
            Mode::Pathtrace => RenderMode::Pathtrace,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut description = SceneDescription::load(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    if let Some(mode) = args.mode {
        description.render.mode = mode.into();
    }
    if let Some(width) = args.width {
        description.render.width = width;
    }
    if let Some(height) = args.height {
        description.render.height = height;
    }
    if let Some(seed) = args.seed {
        description.render.seed = seed;
    }
    description.validate()?;

    let base_dir = args.scene.parent().unwrap_or(Path::new("."));
    let camera = build_camera(&description.camera);
    let (width, height) = (description.render.width, description.render.height);

    log::info!("Rendering {} ({:?})", args.scene.display(), description.render.mode);

    let bgr = match description.render.mode {
        RenderMode::Raytrace => {
            let scene = build_scene(&description, base_dir)?;
            render(&camera, &scene, width, height, &RaytraceOptions::from(&description.render))
        }
        RenderMode::Pathtrace => {
            let scene = build_pathtracing_scene(&description, base_dir)?;
            render_pathtraced(&camera, &scene, width, height, &PathtraceOptions::from(&description.render))
        }
    };

    save_bgr(&bgr, width, height, &args.output)?;
    log::info!("Wrote {}", args.output.display());

    Ok(())
}

/// Write a B, G, R byte buffer as an image file.
fn save_bgr(bgr: &[u8], width: u32, height: u32, path: &Path) -> Result<()> {
    let rgb: Vec<u8> = bgr
        .chunks_exact(3)
        .flat_map(|p| [p[2], p[1], p[0]])
        .collect();

    let image = image::RgbImage::from_raw(width, height, rgb)
        .context("Rendered buffer does not match the image size")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
