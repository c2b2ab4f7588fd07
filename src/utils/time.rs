use std::time::{Duration, Instant};

/// Frame clock.
///
/// Hosts call [`Timer::tick`] once per frame; tests and offline renders drive
/// it deterministically through [`Timer::advance`].
#[derive(Debug, Clone)]
pub struct Timer {
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances by the wall-clock time since the previous tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        self.advance(delta);
    }

    /// Advances by a fixed step.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut timer = Timer::new();
        timer.advance(Duration::from_millis(250));
        timer.advance(Duration::from_millis(250));
        assert_eq!(timer.frame_count, 2);
        assert!((timer.elapsed_seconds() - 0.5).abs() < 1e-6);
        assert!((timer.dt_seconds() - 0.25).abs() < 1e-6);
    }
}
