use anyhow::{Context, Result};

use super::ring::SlotFence;

/// Slot fence backed by the last queue submission made for the slot.
pub struct SubmissionFence {
    device: wgpu::Device,
    pending: Option<wgpu::SubmissionIndex>,
}

impl SubmissionFence {
    pub fn new(device: &wgpu::Device) -> Self {
        Self { device: device.clone(), pending: None }
    }

    /// Records `index` as the work this slot must wait for next time.
    pub fn signal_on(&mut self, index: wgpu::SubmissionIndex) {
        self.pending = Some(index);
    }
}

impl SlotFence for SubmissionFence {
    fn wait(&mut self) -> Result<()> {
        if let Some(index) = self.pending.take() {
            self.device
                .poll(wgpu::PollType::Wait {
                    submission_index: Some(index),
                    timeout: None,
                })
                .context("failed waiting for workspace fence")?;
        }
        Ok(())
    }
}
