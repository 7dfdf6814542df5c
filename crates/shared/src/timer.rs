//! Timer - wall-clock timing of named sections

use std::time::{Duration, Instant};

/// Measures one named section and logs how long it took
#[derive(Debug)]
pub struct Timer {
    section: String,
    start: Instant,
}

impl Timer {
    /// Start timing `section`
    pub fn start(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            start: Instant::now(),
        }
    }

    /// Elapsed time so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer, log the duration and return it in seconds
    pub fn stop(self) -> f64 {
        let dt = self.elapsed().as_secs_f64();
        tracing::info!("Execution of {} took {:.3} (s)", self.section, dt);
        dt
    }

    /// Time a closure; returns its value and the duration in seconds
    pub fn time<T>(section: impl Into<String>, f: impl FnOnce() -> T) -> (T, f64) {
        let timer = Self::start(section);
        let value = f();
        (value, timer.stop())
    }
}
