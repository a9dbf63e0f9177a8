mod app;
mod config;
mod controls;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::PhysicalSize;

use lumen_engine::device::GpuInit;
use lumen_engine::logging::init_logging;
use lumen_engine::window::{Runtime, RuntimeConfig};
use lumen_scene::source::FsSource;
use lumen_scene::{RenderState, load_file};

use crate::app::Viewer;
use crate::config::ViewerConfig;

fn main() -> ExitCode {
    let config = ViewerConfig::parse();
    init_logging(config.logging());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lumen: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ViewerConfig) -> Result<()> {
    let path = &config.scene;
    let scene = load_file(path).with_context(|| format!("failed to load scene '{}'", path.display()))?;
    let state = RenderState::new(scene, config.state_options())?;
    let textures = state
        .textures()
        .build(&mut FsSource::beside(path))
        .context("failed to load textures")?;

    let (width, height) = config.drawing_size();
    let workspaces = config.workspaces as usize;
    let runtime = RuntimeConfig {
        title: "lumen".to_string(),
        initial_size: PhysicalSize::new(width, height),
        workspaces,
        ..Default::default()
    };
    let gpu_init = GpuInit {
        adapter_name: config.physical_device.clone(),
        ..Default::default()
    };

    Runtime::run(runtime, gpu_init, Viewer::new(state, textures, workspaces))
}
