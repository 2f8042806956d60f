mod config;
mod frames;
mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use swarm_core::{
    Controller, DEFAULT_COLOR, Densify, PALETTE, Point3, Rgb, ShapeVariant, densify,
    export_point_cloud, fit_to_count, generate, parse_point_cloud,
};
use swarm_remote::{ShapeClient, api_key_from_env};

use crate::config::SwarmConfig;
use crate::run::{CameraSource, RunOptions};

#[derive(Parser)]
#[command(name = "swarm", about = "Gesture-driven morphing particle cloud")]
struct Cli {
    /// Config file (default: $SWARM_CONFIG, then ~/.swarm/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a built-in shape's target buffer
    Shape {
        /// sphere, cube, heart, dna-helix, saturn or flower
        variant: ShapeVariant,

        /// Number of points (default: particle_count from config)
        #[arg(long)]
        count: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Write the points as JSON instead of printing a summary
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the morph loop headlessly
    Run {
        #[arg(long)]
        shape: Option<ShapeVariant>,

        /// Palette name or hex color
        #[arg(long)]
        color: Option<Rgb>,

        /// Particle size multiplier (0.1 to 3.0)
        #[arg(long)]
        size: Option<f64>,

        /// Manual openness (0 to 1), used while no camera is attached
        #[arg(long)]
        openness: Option<f64>,

        /// `synthetic` or a directory of .ppm frames
        #[arg(long)]
        camera: Option<CameraSource>,

        /// Morph toward a point cloud JSON file instead of a built-in shape
        #[arg(long, conflicts_with = "shape")]
        points: Option<PathBuf>,

        /// How a sparse point cloud is stretched to the particle count
        #[arg(long, default_value = "cycle")]
        densify: Densify,

        /// Number of render ticks
        #[arg(long, default_value_t = 600)]
        ticks: u64,

        #[arg(long)]
        fps: Option<f64>,

        /// Pace ticks to wall-clock time
        #[arg(long)]
        realtime: bool,

        /// Write the final render frame as JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Ask the remote generator for a shape from a text description
    Generate {
        prompt: String,

        /// Densify the result to this many points (default: particle_count)
        #[arg(long)]
        count: Option<usize>,

        #[arg(long, default_value = "cycle")]
        densify: Densify,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the named color swatches
    Palette,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Palette => cmd_palette(),
        Commands::Shape {
            variant,
            count,
            seed,
            out,
        } => {
            let config = SwarmConfig::load(cli.config.as_deref())?;
            cmd_shape(&config, *variant, *count, *seed, out.as_deref())
        }
        Commands::Run {
            shape,
            color,
            size,
            openness,
            camera,
            points,
            densify,
            ticks,
            fps,
            realtime,
            snapshot,
            seed,
        } => {
            let mut config = SwarmConfig::load(cli.config.as_deref())?;
            if let Some(shape) = shape {
                config.shape = *shape;
            }
            if let Some(color) = color {
                config.color = color.to_string();
            }
            if let Some(size) = size {
                config.particle_size = *size;
            }
            if let Some(openness) = openness {
                config.openness = *openness;
            }
            if let Some(fps) = fps {
                config.fps = *fps;
            }
            if seed.is_some() {
                config.seed = *seed;
            }
            let options = RunOptions {
                ticks: *ticks,
                fps: config.fps,
                realtime: *realtime,
            };
            cmd_run(
                &config,
                camera.as_ref(),
                points.as_deref(),
                *densify,
                &options,
                snapshot.as_deref(),
            )
            .await
        }
        Commands::Generate {
            prompt,
            count,
            densify,
            out,
        } => {
            let config = SwarmConfig::load(cli.config.as_deref())?;
            cmd_generate(&config, prompt, *count, *densify, out.as_deref()).await
        }
    }
}

fn cmd_palette() -> Result<()> {
    for (name, color) in PALETTE {
        let marker = if color == DEFAULT_COLOR { " (default)" } else { "" };
        println!("{name:<8} {color}{marker}");
    }
    Ok(())
}

fn cmd_shape(
    config: &SwarmConfig,
    variant: ShapeVariant,
    count: Option<usize>,
    seed: Option<u64>,
    out: Option<&Path>,
) -> Result<()> {
    let count = count.unwrap_or(config.particle_count);
    let mut rng = match seed.or(config.seed) {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let points = fit_to_count(generate(variant, count, &mut rng), count);

    match out {
        Some(path) => {
            write_points(path, &points)?;
            println!("wrote {} points ({variant}) to {}", points.len(), path.display());
        }
        None => {
            let (min, max) = bounds(&points);
            let extent = points.iter().map(|p| p.norm()).fold(0.0, f64::max);
            println!("shape:  {variant}");
            println!("points: {}", points.len());
            println!("extent: {extent:.3}");
            println!("min:    ({:.3}, {:.3}, {:.3})", min.x, min.y, min.z);
            println!("max:    ({:.3}, {:.3}, {:.3})", max.x, max.y, max.z);
        }
    }
    Ok(())
}

async fn cmd_run(
    config: &SwarmConfig,
    camera: Option<&CameraSource>,
    points: Option<&Path>,
    strategy: Densify,
    options: &RunOptions,
    snapshot: Option<&Path>,
) -> Result<()> {
    let mut controller = Controller::new(config.controller_config()?);

    if let Some(path) = points {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cloud = parse_point_cloud(&json)
            .with_context(|| format!("failed to parse point cloud {}", path.display()))?;
        controller
            .set_points(&cloud, strategy)
            .context("failed to apply point cloud")?;
    }

    // Acquisition failure is already logged by the extractor; the run goes on
    // with manual openness.
    if let Some(camera) = camera
        && controller.activate_camera(|| camera.acquire()).is_err()
    {
        tracing::debug!("camera unavailable, openness stays at {}", config.openness);
    }

    let summary = run::run(&mut controller, options).await?;
    summary.print();

    if let Some(path) = snapshot {
        run::write_snapshot(path, &summary.last_frame)?;
        println!("snapshot written to {}", path.display());
    }
    Ok(())
}

async fn cmd_generate(
    config: &SwarmConfig,
    prompt: &str,
    count: Option<usize>,
    strategy: Densify,
    out: Option<&Path>,
) -> Result<()> {
    let api_key = config.remote.api_key.clone().or_else(api_key_from_env);
    let mut client = ShapeClient::new(api_key);
    if let Some(model) = &config.remote.model {
        client = client.with_model(model);
    }
    if let Some(endpoint) = &config.remote.endpoint {
        client = client.with_endpoint(endpoint);
    }

    let sparse = match client.generate(prompt).await {
        Ok(points) => points,
        Err(e) => {
            tracing::error!("shape generation failed: {e}");
            return Err(e).context("shape generation failed");
        }
    };
    let count = count.unwrap_or(config.particle_count);
    let points = densify(&sparse, count, strategy);

    match out {
        Some(path) => {
            write_points(path, &points)?;
            println!(
                "wrote {} points ({} generated) to {}",
                points.len(),
                sparse.len(),
                path.display()
            );
        }
        None => println!("{}", export_point_cloud(&points)?),
    }
    Ok(())
}

fn write_points(path: &Path, points: &[Point3]) -> Result<()> {
    let json = export_point_cloud(points).context("failed to serialize points")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn bounds(points: &[Point3]) -> (Point3, Point3) {
    if points.is_empty() {
        return (Point3::ORIGIN, Point3::ORIGIN);
    }
    let init = (
        Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
    );
    points.iter().fold(init, |(lo, hi), p| {
        (
            Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
            Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
        )
    })
}
