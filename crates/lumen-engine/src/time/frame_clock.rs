use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is capped so a stall (debugger, minimized window, slow
/// swapchain recreation) shows up as one short step instead of a jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_max: Duration,
}

impl FrameClock {
    /// Largest delta handed to the application.
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self::with_max(Self::DEFAULT_DT_MAX)
    }

    pub fn with_max(dt_max: Duration) -> Self {
        Self::starting_at(Instant::now(), dt_max)
    }

    fn starting_at(last: Instant, dt_max: Duration) -> Self {
        Self { last, frame_index: 0, dt_max }
    }

    /// Resets the clock baseline, e.g. when resuming from suspension.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).min(self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_elapsed_time() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0, FrameClock::DEFAULT_DT_MAX);
        let ft = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-6);
        assert_eq!(ft.frame_index, 0);
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(32)).frame_index, 1);
    }

    #[test]
    fn long_stall_is_capped() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0, FrameClock::DEFAULT_DT_MAX);
        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert!((ft.dt - 0.1).abs() < 1e-6);
    }

    #[test]
    fn backwards_time_is_zero() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(t0, FrameClock::DEFAULT_DT_MAX);
        assert_eq!(clock.tick_at(t0 - Duration::from_millis(10)).dt, 0.0);
    }
}
