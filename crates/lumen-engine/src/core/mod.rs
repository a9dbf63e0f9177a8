//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application: the four `App` callbacks and the per-frame context.

mod app;
mod ctx;

pub use app::{App, SwapchainEvent};
pub use ctx::FrameCtx;
