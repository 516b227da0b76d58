use anyhow::{Context, Result};
use clap::Parser;
use dual_rasterizer::app::run_headless;
use dual_rasterizer::io::config::Config;
use log::info;

/// TOML-driven CPU software rasterizer
#[derive(Parser, Debug)]
#[command(name = "dual-rasterizer", version)]
#[command(about = "Renders a scene on the CPU and saves the last frame as an image")]
struct Cli {
    /// Scene configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Output image path, overrides [render].output
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Number of frames to simulate before saving
    #[arg(long, value_name = "N")]
    frames: Option<usize>,

    /// Shading mode: observed_area, diffuse, specular or combined
    #[arg(long, value_name = "MODE")]
    shading: Option<String>,

    /// Visualize the depth buffer instead of shaded color
    #[arg(long)]
    depth_view: bool,

    /// Disable tangent-space normal mapping
    #[arg(long)]
    no_normal_map: bool,

    /// Fill triangle bounding boxes instead of shading
    #[arg(long)]
    bounding_box: bool,

    /// Cycle every mesh's cull mode N times (back -> front -> none)
    #[arg(long, value_name = "N", default_value_t = 0)]
    cull_cycle: usize,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config file: {}", path);
                Config::load(path)
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Could not load '{}'", path))?
            }
            None => {
                info!("Using default settings");
                Config::default()
            }
        };

        if let Some(output) = &self.output {
            config.render.output = output.clone();
        }
        if let Some(frames) = self.frames {
            config.render.frames = frames;
        }
        if let Some(shading) = &self.shading {
            config.render.shading_mode = shading.clone();
        }
        if self.depth_view {
            config.render.view_mode = "depth".to_string();
        }
        if self.no_normal_map {
            config.render.normal_mapping = false;
        }
        if self.bounding_box {
            config.render.show_bounding_box = true;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let stats = run_headless(&config, cli.cull_cycle)?;
    info!(
        "Last frame: {} meshes, {} triangles, {} pixels written",
        stats.meshes_drawn, stats.triangles, stats.pixels_written
    );
    Ok(())
}
