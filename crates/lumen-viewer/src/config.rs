//! Command line configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lumen_engine::logging::LoggingConfig;
use lumen_scene::{CullMode, StateOptions};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum Culling {
    None,
    Frustum,
}

impl From<Culling> for CullMode {
    fn from(c: Culling) -> Self {
        match c {
            Culling::None => CullMode::None,
            Culling::Frustum => CullMode::Frustum,
        }
    }
}

/// Real-time viewer for s72 scenes.
#[derive(Debug, Clone, Parser)]
#[command(name = "lumen", version, about)]
pub struct ViewerConfig {
    /// Scene file to load.
    pub scene: PathBuf,

    /// Scene camera to view through.
    #[arg(long, value_name = "NAME")]
    pub camera: Option<String>,

    /// Per-instance visibility test.
    #[arg(long, value_enum, default_value_t = Culling::None)]
    pub culling: Culling,

    /// Adapter to render with, by exact name.
    #[arg(long, value_name = "NAME")]
    pub physical_device: Option<String>,

    /// Initial window size in physical pixels.
    #[arg(
        long,
        num_args = 2,
        value_names = ["W", "H"],
        default_values_t = [800u32, 540],
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub drawing_size: Vec<u32>,

    /// Frames that may be in flight at once.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub workspaces: u32,

    /// Verbose logging for the lumen crates.
    #[arg(long, overrides_with = "no_debug")]
    debug: bool,

    #[arg(long = "no-debug", overrides_with = "debug")]
    no_debug: bool,
}

impl ViewerConfig {
    pub fn debug(&self) -> bool {
        self.debug && !self.no_debug
    }

    pub fn drawing_size(&self) -> (u32, u32) {
        match self.drawing_size[..] {
            [w, h] => (w, h),
            _ => (800, 540),
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            debug: self.debug(),
            ..Default::default()
        }
    }

    pub fn state_options(&self) -> StateOptions {
        StateOptions {
            camera: self.camera.clone(),
            cull: self.culling.into(),
        }
    }
}
