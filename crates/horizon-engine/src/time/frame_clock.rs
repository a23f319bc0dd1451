use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,

    /// Seconds since the clock was created. Not clamped; drives animation.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (100µs .. 250ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline. Elapsed time keeps counting from creation.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
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
    fn dt_is_clamped_to_max_after_stall() {
        let mut clock = FrameClock::new();
        let later = clock.last + Duration::from_secs(3);
        let ft = clock.tick_at(later);
        assert_eq!(ft.dt, 0.25);
        assert!(ft.elapsed >= 3.0);
    }

    #[test]
    fn dt_is_clamped_to_min_for_back_to_back_ticks() {
        let mut clock = FrameClock::new();
        let at = clock.last;
        let ft = clock.tick_at(at);
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        let base = clock.last;
        assert_eq!(clock.tick_at(base).frame_index, 0);
        assert_eq!(clock.tick_at(base + Duration::from_millis(16)).frame_index, 1);
    }

    #[test]
    fn reset_keeps_elapsed_origin() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        clock.reset();
        let ft = clock.tick_at(start + Duration::from_secs(2));
        assert!((ft.elapsed - 2.0).abs() < 1e-3);
    }
}
