//! Fixed-step simulation clock

/// Tracks simulated time in whole ticks of a fixed length
#[derive(Debug, Clone)]
pub struct Time {
    /// Ticks per simulated second
    tick_rate: u32,
    /// Length of one tick in seconds
    delta: f32,
    /// Ticks advanced so far
    tick: u64,
}

impl Time {
    /// Create a clock running at `ticks_per_second` (at least one)
    #[must_use]
    pub fn new(ticks_per_second: u32) -> Self {
        let tick_rate = ticks_per_second.max(1);
        Self {
            tick_rate,
            delta: 1.0 / tick_rate as f32,
            tick: 0,
        }
    }

    /// Advance by one tick
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Length of a tick in seconds
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[must_use]
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Number of ticks advanced so far
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since the clock started
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.tick as f64 / f64::from(self.tick_rate)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(60)
    }
}
