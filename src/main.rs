use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

mod raytracing;
use raytracing::camera::Camera;
use raytracing::core::{demo_scene, RenderSettings};
use raytracing::parser::{SceneDescription, SceneParser};
use raytracing::render::Renderer;
use raytracing::{RsqrtStrategy, Vec3};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file, the built-in scene is rendered when omitted
    scene: Option<PathBuf>,
    /// the path where the rendered image is saved, `.ppm` is written as binary P6
    #[arg(short, long, default_value = "out.ppm")]
    output: PathBuf,
    /// override the image width
    #[arg(long)]
    width: Option<u32>,
    /// override the image height
    #[arg(long)]
    height: Option<u32>,
    /// override the vertical field of view, in degrees
    #[arg(long)]
    fov: Option<f64>,
    /// override the maximum number of reflection/refraction bounces
    #[arg(long)]
    max_depth: Option<u32>,
    /// normalize vectors with the bit-level reciprocal square root approximation
    #[arg(long, default_value = "false")]
    fast_rsqrt: bool,
    /// render on the current thread only
    #[arg(long, default_value = "false")]
    serial: bool,
}

fn load_scene(args: &Args) -> Result<SceneDescription> {
    let Some(path) = &args.scene else {
        log::info!("No scene file given, rendering the built-in scene");
        return Ok(SceneDescription {
            settings: RenderSettings::default(),
            camera_position: Vec3::zero(),
            scene: demo_scene(),
        });
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading scene file {}", path.display()))?;
    SceneParser::new(&content).parse_scene().map_err(|parser_error| {
        parser_error.print_error_location(&content);
        anyhow!("parser error in {}: {}", path.display(), parser_error)
    })
}

fn apply_overrides(args: &Args, settings: &mut RenderSettings) -> Result<()> {
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if let Some(fov) = args.fov {
        settings.fov = fov;
    }
    if let Some(max_depth) = args.max_depth {
        settings.max_depth = max_depth;
    }
    if args.fast_rsqrt {
        settings.rsqrt = RsqrtStrategy::Fast;
    }
    if settings.width == 0 || settings.height == 0 {
        return Err(anyhow!(
            "image size must be positive, got {}x{}",
            settings.width,
            settings.height
        ));
    }
    if !(settings.fov > 0.0 && settings.fov < 180.0) {
        return Err(anyhow!("field of view must be in (0, 180), got {}", settings.fov));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let SceneDescription {
        mut settings,
        camera_position,
        scene,
    } = load_scene(&args)?;
    apply_overrides(&args, &mut settings)?;

    let lights = scene.lights().count();
    log::info!(
        "Scene with {} objects, {} lights",
        scene.objects.len(),
        lights
    );
    if lights == 0 {
        log::warn!("The scene has no emissive object, diffuse surfaces will render black");
    }
    log::debug!("Render settings: {:?}", settings);

    let camera = Camera::new(camera_position, &settings);
    let frame = Renderer::new(&scene, &settings, camera).render(!args.serial);

    frame
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());
    Ok(())
}
