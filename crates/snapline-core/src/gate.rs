//! Velocity gate for the guideline detector.
//!
//! Fast drags skip guideline detection for the frame: matches found at that
//! speed are never seen by the user and would only cost frame time.

use crate::context::Instant;
use kurbo::Vec2;

/// Reference frame length in milliseconds.
pub const REFERENCE_FRAME_MS: f64 = 16.0;

/// Default maximum normalized velocity, in canvas units per reference frame.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 40.0;

/// Elapsed times are clamped to at least this many milliseconds.
const MIN_ELAPSED_MS: f64 = 1.0;

/// Tracks the previous drag sample and measures normalized velocity.
#[derive(Debug, Clone)]
pub struct VelocityGate {
    threshold: f64,
    last: Option<(Instant, Vec2)>,
}

impl Default for VelocityGate {
    fn default() -> Self {
        Self::new(DEFAULT_VELOCITY_THRESHOLD)
    }
}

impl VelocityGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, last: None }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Record a sample and return the velocity since the previous one,
    /// normalized to [`REFERENCE_FRAME_MS`]. The first sample has none.
    pub fn sample(&mut self, timestamp: Instant, delta: Vec2) -> Option<f64> {
        let velocity = self.last.map(|(last_time, last_delta)| {
            let elapsed_ms = timestamp.saturating_duration_since(last_time).as_secs_f64() * 1000.0;
            let distance = (delta - last_delta).hypot();
            distance / elapsed_ms.max(MIN_ELAPSED_MS) * REFERENCE_FRAME_MS
        });
        self.last = Some((timestamp, delta));
        velocity
    }

    /// Record a sample and report whether detection should be skipped.
    pub fn is_too_fast(&mut self, timestamp: Instant, delta: Vec2) -> bool {
        match self.sample(timestamp, delta) {
            Some(velocity) if velocity > self.threshold => {
                log::trace!("Velocity {:.1} above {:.1}, skipping guidelines", velocity, self.threshold);
                true
            }
            _ => false,
        }
    }

    /// Forget the previous sample.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
