//! Time utilities for the agent loop

use std::time::{Duration, Instant};

/// Server simulation step in seconds
pub const SIM_STEP_SECONDS: f64 = 0.05;

/// Server simulation steps per second
pub const SIMULATION_SPS: u32 = 20;

/// Duration of one simulation step
pub fn step_duration() -> Duration {
    Duration::from_micros(1_000_000 / SIMULATION_SPS as u64)
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
