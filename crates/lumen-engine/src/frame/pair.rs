use anyhow::{Context, Result};

use crate::gpu::{AllocatedBuffer, Allocator, BufferKind, align_to};

/// Growth granularity for growable pairs, in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// Smallest multiple of [`PAGE_SIZE`] that holds `needed` bytes.
pub fn page_rounded(needed: u64) -> u64 {
    needed.div_ceil(PAGE_SIZE) * PAGE_SIZE
}

/// What a [`StagedPair`] needs from the allocator.
pub trait PairAllocator {
    type Buffer;

    fn create_half(
        &mut self,
        label: &str,
        size: u64,
        kind: BufferKind,
        usage: wgpu::BufferUsages,
    ) -> Result<Self::Buffer>;

    fn destroy_half(&mut self, buffer: Self::Buffer);
}

impl PairAllocator for Allocator {
    type Buffer = AllocatedBuffer;

    fn create_half(
        &mut self,
        label: &str,
        size: u64,
        kind: BufferKind,
        usage: wgpu::BufferUsages,
    ) -> Result<AllocatedBuffer> {
        self.create_buffer(label, size, kind, usage)
    }

    fn destroy_half(&mut self, buffer: AllocatedBuffer) {
        self.destroy_buffer(buffer);
    }
}

/// Host-visible staging buffer paired with a device-local buffer of the same size.
///
/// The staging half is written by the CPU and copied into the resident half
/// at the start of each frame. Both halves always share one capacity.
#[derive(Debug)]
pub struct StagedPair<B> {
    pub staging: B,
    pub resident: B,
    capacity: u64,
    usage: wgpu::BufferUsages,
    label: String,
}

impl<B> StagedPair<B> {
    pub fn new<A>(alloc: &mut A, label: &str, size: u64, usage: wgpu::BufferUsages) -> Result<Self>
    where
        A: PairAllocator<Buffer = B>,
    {
        let staging = alloc
            .create_half(&format!("{label} staging"), size, BufferKind::Staging, usage)
            .with_context(|| format!("failed to allocate '{label}' staging buffer"))?;
        let resident = match alloc.create_half(label, size, BufferKind::Resident, usage) {
            Ok(b) => b,
            Err(e) => {
                alloc.destroy_half(staging);
                return Err(e.context(format!("failed to allocate '{label}' buffer")));
            }
        };

        Ok(Self {
            staging,
            resident,
            capacity: size,
            usage,
            label: label.to_string(),
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Grows both halves to `page_rounded(needed)` when `needed` exceeds the capacity.
    ///
    /// Returns `true` when the buffers were replaced, so bindings that point
    /// at the resident half must be rewritten.
    pub fn ensure_capacity<A>(&mut self, alloc: &mut A, needed: u64) -> Result<bool>
    where
        A: PairAllocator<Buffer = B>,
    {
        if needed <= self.capacity {
            return Ok(false);
        }

        let size = page_rounded(needed);
        let fresh = Self::new(alloc, &self.label, size, self.usage)?;
        let old = std::mem::replace(self, fresh);
        old.destroy(alloc);

        log::info!("re-allocated '{}' buffers to {size} bytes", self.label);
        Ok(true)
    }

    pub fn destroy<A>(self, alloc: &mut A)
    where
        A: PairAllocator<Buffer = B>,
    {
        alloc.destroy_half(self.staging);
        alloc.destroy_half(self.resident);
    }
}

impl StagedPair<AllocatedBuffer> {
    /// Waits for the staging half to be mapped again after the last frame.
    pub fn finish_map(&mut self, device: &wgpu::Device) -> Result<()> {
        self.staging
            .finish_map(device)
            .with_context(|| format!("'{}' staging buffer", self.label))
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.staging
            .write(bytes)
            .with_context(|| format!("failed to write '{}' staging buffer", self.label))
    }

    /// Unmaps the staging half and records a copy of its first `len` bytes.
    pub fn record_copy(&mut self, encoder: &mut wgpu::CommandEncoder, len: u64) -> Result<()> {
        self.staging.unmap();
        let len = align_to(len, wgpu::COPY_BUFFER_ALIGNMENT).min(self.resident.size);
        if len == 0 {
            return Ok(());
        }
        encoder.copy_buffer_to_buffer(self.staging.buffer()?, 0, self.resident.buffer()?, 0, len);
        Ok(())
    }

    /// Asks for the staging half to be mapped once the submitted copy is done.
    pub fn remap(&mut self) {
        self.staging.request_map();
    }

    pub fn resident(&self) -> Result<&wgpu::Buffer> {
        self.resident.buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockBuffer {
        id: u32,
        kind: BufferKind,
        size: u64,
    }

    #[derive(Default)]
    struct MockAlloc {
        next_id: u32,
        live: Vec<u32>,
        fail_resident: bool,
    }

    impl PairAllocator for MockAlloc {
        type Buffer = MockBuffer;

        fn create_half(
            &mut self,
            _label: &str,
            size: u64,
            kind: BufferKind,
            _usage: wgpu::BufferUsages,
        ) -> Result<MockBuffer> {
            if self.fail_resident && kind == BufferKind::Resident {
                anyhow::bail!("out of memory");
            }
            self.next_id += 1;
            self.live.push(self.next_id);
            Ok(MockBuffer { id: self.next_id, kind, size })
        }

        fn destroy_half(&mut self, buffer: MockBuffer) {
            self.live.retain(|&id| id != buffer.id);
        }
    }

    const TRANSFORM_BYTES: u64 = 192;

    // ── rounding ──────────────────────────────────────────────────────────

    #[test]
    fn page_rounding() {
        assert_eq!(page_rounded(1), 4096);
        assert_eq!(page_rounded(4096), 4096);
        assert_eq!(page_rounded(4097), 8192);
        assert_eq!(page_rounded(2000 * TRANSFORM_BYTES), 385_024);
    }

    // ── growth ────────────────────────────────────────────────────────────

    #[test]
    fn grows_from_10_to_2000_instances() {
        let mut alloc = MockAlloc::default();
        let mut pair =
            StagedPair::new(&mut alloc, "transforms", PAGE_SIZE, wgpu::BufferUsages::STORAGE).unwrap();

        assert!(!pair.ensure_capacity(&mut alloc, 10 * TRANSFORM_BYTES).unwrap());
        assert!(pair.ensure_capacity(&mut alloc, 2000 * TRANSFORM_BYTES).unwrap());
        assert_eq!(pair.capacity(), 385_024);
        assert_eq!(pair.capacity() % PAGE_SIZE, 0);
        assert!(pair.capacity() >= 2000 * TRANSFORM_BYTES);
    }

    #[test]
    fn capacity_never_decreases() {
        let mut alloc = MockAlloc::default();
        let mut pair =
            StagedPair::new(&mut alloc, "t", PAGE_SIZE, wgpu::BufferUsages::STORAGE).unwrap();

        let mut last = pair.capacity();
        for count in [1u64, 5, 30, 30, 21, 400, 401, 50, 2000, 7] {
            let needed = count * TRANSFORM_BYTES;
            pair.ensure_capacity(&mut alloc, needed).unwrap();
            assert!(pair.capacity() >= last);
            assert!(pair.capacity() >= needed);
            last = pair.capacity();
        }
    }

    #[test]
    fn halves_stay_paired_and_old_ones_are_destroyed() {
        let mut alloc = MockAlloc::default();
        let mut pair =
            StagedPair::new(&mut alloc, "t", 64, wgpu::BufferUsages::UNIFORM).unwrap();
        assert_eq!(pair.staging.size, pair.resident.size);

        pair.ensure_capacity(&mut alloc, 10_000).unwrap();
        assert_eq!(pair.staging.size, pair.resident.size);
        assert_eq!(pair.staging.kind, BufferKind::Staging);
        assert_eq!(pair.resident.kind, BufferKind::Resident);
        assert_eq!(alloc.live, vec![pair.staging.id, pair.resident.id]);

        pair.destroy(&mut alloc);
        assert!(alloc.live.is_empty());
    }

    #[test]
    fn failed_allocation_propagates_and_leaves_nothing_behind() {
        let mut alloc = MockAlloc { fail_resident: true, ..Default::default() };
        let err = StagedPair::new(&mut alloc, "camera", 64, wgpu::BufferUsages::UNIFORM).unwrap_err();
        assert!(format!("{err:#}").contains("camera"));
        assert!(alloc.live.is_empty());
    }
}
