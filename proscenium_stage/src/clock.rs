// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame timing: elapsed accumulation and a rolling FPS estimate.

/// Accumulates frame deltas and refreshes an FPS estimate about once per
/// second.
///
/// The clock is driven externally with [`tick`](Self::tick); it does not read
/// wall time itself, so a host can feed fixed deltas for deterministic runs.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    elapsed: f64,
    frames: u64,
    window_time: f64,
    window_frames: u32,
    fps: f64,
}

impl FrameClock {
    /// A clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.elapsed += dt;
        self.frames += 1;
        self.window_time += dt;
        self.window_frames += 1;
        if self.window_time >= 1.0 {
            self.fps = f64::from(self.window_frames) / self.window_time;
            log::debug!("fps: {:.1}", self.fps);
            self.window_time = 0.0;
            self.window_frames = 0;
        }
    }

    /// Total accumulated time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total frames ticked.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The estimate from the last completed one-second window; `0.0` until a
    /// window completes.
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Wall-clock frame delta source backed by `Instant`.
#[cfg(feature = "std")]
#[derive(Clone, Debug)]
pub struct Ticker {
    last: std::time::Instant,
}

#[cfg(feature = "std")]
impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Ticker {
    /// Start measuring from now.
    pub fn new() -> Self {
        Self {
            last: std::time::Instant::now(),
        }
    }

    /// Seconds since the previous call (or construction).
    pub fn delta(&mut self) -> f64 {
        let now = std::time::Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_updates_once_per_second_window() {
        // 1/16 is exact in binary, so the window closes on the 16th tick.
        let mut clock = FrameClock::new();
        for _ in 0..15 {
            clock.tick(1.0 / 16.0);
        }
        // Window not yet complete.
        assert_eq!(clock.fps(), 0.0);

        clock.tick(1.0 / 16.0);
        assert_eq!(clock.fps(), 16.0);

        // The next window starts fresh.
        clock.tick(1.0 / 16.0);
        assert_eq!(clock.fps(), 16.0);
        assert_eq!(clock.frames(), 17);
    }

    #[test]
    fn elapsed_accumulates_exactly() {
        let mut clock = FrameClock::new();
        clock.tick(0.25);
        clock.tick(0.5);
        assert_eq!(clock.elapsed(), 0.75);
    }
}
