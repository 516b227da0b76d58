use crate::core::color::grey;
use crate::io::config::Config;
use crate::io::image::save_framebuffer;
use crate::pipeline::renderer::{FrameStats, RenderBackend, SoftwareRenderer};
use crate::pipeline::shader::Shader;
use crate::scene::loader::build_scene;
use anyhow::{Context, Result};
use log::{debug, info};
use nalgebra::Vector3;
use std::time::Instant;

/// Builds the software backend described by the `[render]` and `[shading]`
/// sections.
pub fn build_renderer(config: &Config) -> Result<SoftwareRenderer, String> {
    if config.render.width == 0 || config.render.height == 0 {
        return Err(format!(
            "Invalid frame size {}x{}",
            config.render.width, config.render.height
        ));
    }
    let settings = config.render_settings()?;
    let shader = Shader::new(
        Vector3::from(config.shading.light_direction),
        config.shading.light_intensity,
        config.shading.shininess,
    );

    let mut renderer = SoftwareRenderer::new(config.render.width, config.render.height)
        .with_settings(settings)
        .with_shader(shader);
    renderer.rasterizer.ambient = grey(config.shading.ambient);
    renderer.rasterizer.depth_band = (config.render.depth_band[0], config.render.depth_band[1]);
    renderer.set_background_color(Vector3::from(config.render.background_color));
    Ok(renderer)
}

/// Runs the frame loop without a window and saves the last frame.
///
/// Every frame applies the scripted `[input]` to the scene before rendering.
/// `cull_cycles` advances every mesh's cull mode that many times up front.
pub fn run_headless(config: &Config, cull_cycles: usize) -> Result<FrameStats> {
    info!(
        "Starting headless mode ({}x{}, {} frames)...",
        config.render.width, config.render.height, config.render.frames
    );

    let mut scene = build_scene(config).map_err(anyhow::Error::msg)?;
    let mut renderer = build_renderer(config).map_err(anyhow::Error::msg)?;
    for _ in 0..cull_cycles {
        scene.cycle_cull_modes();
    }

    let input = config.input.frame_input();
    let start_time = Instant::now();
    let mut stats = FrameStats::default();

    for frame in 0..config.render.frames.max(1) {
        scene.update(config.render.frame_time, &input);
        stats = renderer
            .render(&scene.snapshot(), &scene.meshes)
            .with_context(|| format!("Failed to render frame {}", frame))?;
        debug!("Frame {} done", frame);
    }

    info!("Render completed in {:.2?}", start_time.elapsed());

    info!("Saving output to '{}'...", config.render.output);
    save_framebuffer(&renderer.framebuffer, &config.render.output).map_err(anyhow::Error::msg)?;
    info!("Done.");
    Ok(stats)
}
