//! GPU device + surface management.
//!
//! This module is responsible for:
//! - selecting an adapter and checking required capabilities
//! - creating the wgpu Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring and presenting surface images

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::{GpuInit, REQUIRED_IMMEDIATE_SIZE};
pub use surface::SurfaceErrorAction;
