//! Simulated delays
//!
//! Delays are drawn in abstract time units so a run stays reproducible
//! under a fixed seed no matter how long one unit lasts. A zero unit draws
//! the same random durations but never sleeps.

use rand::Rng;
use rand::rngs::StdRng;
use std::ops::Range;
use std::time::Duration;

/// Delay before each simulated upload chunk
pub const UPLOAD_CHUNK_DELAY: Range<f64> = 100.0..300.0;

/// Delay before each analysis step
pub const ANALYSIS_STEP_DELAY: Range<f64> = 500.0..1500.0;

/// Delay before the quote is assembled
pub const QUOTE_DELAY: f64 = 1000.0;

/// Converts time units into real suspensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    unit: Duration,
}

impl Pacer {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// A pacer that never sleeps
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// Suspend for a random number of units drawn from `range`
    ///
    /// Returns the number of units drawn.
    pub async fn pause(&self, rng: &mut StdRng, range: Range<f64>) -> f64 {
        let units = rng.random_range(range);
        self.pause_units(units).await;
        units
    }

    /// Suspend for a fixed number of units
    pub async fn pause_units(&self, units: f64) {
        if self.unit.is_zero() || units <= 0.0 {
            return;
        }
        tokio::time::sleep(self.unit.mul_f64(units)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::time::Instant;

    #[tokio::test]
    async fn test_drawn_units_stay_in_range() {
        let pacer = Pacer::instant();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let units = pacer.pause(&mut rng, UPLOAD_CHUNK_DELAY).await;
            assert!((100.0..300.0).contains(&units));
        }
    }

    #[tokio::test]
    async fn test_draws_do_not_depend_on_unit() {
        let mut fast = StdRng::seed_from_u64(11);
        let mut slow = StdRng::seed_from_u64(11);

        let a = Pacer::instant().pause(&mut fast, ANALYSIS_STEP_DELAY).await;
        let b = Pacer::new(Duration::from_micros(1))
            .pause(&mut slow, ANALYSIS_STEP_DELAY)
            .await;

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_pause_units_sleeps() {
        let pacer = Pacer::new(Duration::from_millis(1));
        let start = Instant::now();

        pacer.pause_units(20.0).await;

        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
