//! Similarity-to-interval mapping

use std::time::Duration;

use tracing::warn;

/// Maps the similarity of consecutive frames to the next capture delay.
///
/// A static scene (similarity near 1.0) stretches the interval toward
/// `gain * (1.0 - pivot)` seconds, while a changing scene tightens the
/// cadence; scores at or below `similarity_floor` are clamped, so the pace
/// never drops under the floor interval. The numbers are policy, not
/// protocol; the defaults reproduce the reference behavior (6s floor, 66s
/// ceiling, 10s when scoring fails).
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    /// Seconds of delay per unit of similarity above `pivot`.
    pub gain: f64,

    /// Similarity at which the interval would reach zero.
    pub pivot: f64,

    /// Scores below this are treated as exactly this.
    pub similarity_floor: f64,

    /// Interval used when similarity cannot be computed.
    pub fallback: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            gain: 120.0,
            pivot: 0.45,
            similarity_floor: 0.5,
            fallback: Duration::from_secs(10),
        }
    }
}

impl PacingPolicy {
    /// Next capture delay for a similarity score. A missing score never
    /// propagates as an error; it maps to the fallback interval.
    pub fn interval_for(&self, score: Option<f64>) -> Duration {
        let Some(score) = score else {
            warn!("similarity unavailable, falling back to {:?}", self.fallback);
            return self.fallback;
        };

        let clamped = score.max(self.similarity_floor);
        // The nudge keeps products that are exact in rational arithmetic
        // (120 * 0.05 = 6) from flooring one short in f64.
        let seconds = (self.gain * (clamped - self.pivot) + 1e-9).floor();
        Duration::from_secs(seconds.max(0.0) as u64)
    }
}
