//! GPU memory: owning handles, buffers, images and the allocator that makes them.

mod allocator;
mod buffer;
mod handle;
mod image;

pub use allocator::Allocator;
pub use buffer::{AllocatedBuffer, BufferKind, align_to};
pub use handle::Handle;
pub use image::AllocatedImage;
