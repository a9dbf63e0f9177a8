use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};

use super::handle::Handle;

/// Where a buffer lives and how the host reaches it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    /// Host-visible (`MAP_WRITE | COPY_SRC`), written through a mapping.
    Staging,
    /// Device-local, filled by copies from a staging buffer.
    Resident,
}

/// A buffer together with its size and, for staging buffers, its map state.
#[derive(Debug)]
pub struct AllocatedBuffer {
    pub handle: Handle<wgpu::Buffer>,
    pub size: u64,
    pub kind: BufferKind,
    mapped: Arc<AtomicBool>,
    map_pending: bool,
}

impl AllocatedBuffer {
    pub(crate) fn new(buffer: wgpu::Buffer, size: u64, kind: BufferKind) -> Self {
        // Staging buffers are created mapped.
        let mapped = kind == BufferKind::Staging;
        Self {
            handle: Handle::new(buffer),
            size,
            kind,
            mapped: Arc::new(AtomicBool::new(mapped)),
            map_pending: false,
        }
    }

    pub fn buffer(&self) -> Result<&wgpu::Buffer> {
        match self.handle.get() {
            Some(b) => Ok(b),
            None => bail!("buffer handle is empty"),
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped.load(Ordering::Acquire)
    }

    /// Copies `bytes` to the start of a mapped staging buffer.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        if self.kind != BufferKind::Staging {
            bail!("write through a mapping needs a staging buffer");
        }
        if !self.is_mapped() {
            bail!("staging buffer is not mapped (map pending: {})", self.map_pending);
        }
        let len = align_to(bytes.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT);
        if len > self.size {
            bail!("write of {} bytes exceeds buffer of {} bytes", bytes.len(), self.size);
        }

        let buffer = self.buffer()?;
        let mut view = buffer.get_mapped_range_mut(0..len);
        view[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Gives the mapping back to the device so the buffer can be copied from.
    pub fn unmap(&mut self) {
        if self.kind != BufferKind::Staging || !self.is_mapped() {
            return;
        }
        if let Some(b) = self.handle.get() {
            b.unmap();
        }
        self.mapped.store(false, Ordering::Release);
    }

    /// Requests the mapping back once the device is done with the buffer.
    ///
    /// Completion is observed on the next device poll.
    pub fn request_map(&mut self) {
        if self.kind != BufferKind::Staging || self.is_mapped() || self.map_pending {
            return;
        }
        let Some(b) = self.handle.get() else { return };

        let mapped = Arc::clone(&self.mapped);
        b.map_async(wgpu::MapMode::Write, .., move |result| match result {
            Ok(()) => mapped.store(true, Ordering::Release),
            Err(e) => log::error!("staging buffer map failed: {e}"),
        });
        self.map_pending = true;
    }

    /// Blocks until a pending map request has resolved.
    pub fn finish_map(&mut self, device: &wgpu::Device) -> Result<()> {
        if !self.map_pending {
            return Ok(());
        }
        if !self.is_mapped() {
            device
                .poll(wgpu::PollType::wait_indefinitely())
                .map_err(|e| anyhow::anyhow!("device poll failed: {e}"))?;
        }
        self.map_pending = false;
        if !self.is_mapped() {
            bail!("staging buffer did not map");
        }
        Ok(())
    }
}

/// Rounds `n` up to a multiple of `align` (a power of two).
pub fn align_to(n: u64, align: u64) -> u64 {
    (n + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_power_of_two() {
        assert_eq!(align_to(0, 4), 0);
        assert_eq!(align_to(1, 4), 4);
        assert_eq!(align_to(4, 4), 4);
        assert_eq!(align_to(257, 256), 512);
    }
}
