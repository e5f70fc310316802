use crate::error::DefinitionError;
use rand::Rng;
use std::time::Duration;

/// Pause between two consecutive tasks of one simulated user, drawn uniformly
/// from `[min, max]` seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WaitTime {
    min: f64,
    max: f64,
}

impl WaitTime {
    pub fn between(min: f64, max: f64) -> Result<Self, DefinitionError> {
        let representable = |secs: f64| secs >= 0.0 && Duration::try_from_secs_f64(secs).is_ok();
        if !representable(min) || !representable(max) || min > max {
            return Err(DefinitionError::InvalidWaitBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn constant(secs: f64) -> Result<Self, DefinitionError> {
        Self::between(secs, secs)
    }

    #[inline]
    #[must_use]
    pub fn min_secs(&self) -> f64 {
        self.min
    }

    #[inline]
    #[must_use]
    pub fn max_secs(&self) -> f64 {
        self.max
    }

    /// Inclusive of both bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let secs = if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        };
        Duration::from_secs_f64(secs)
    }
}

impl Default for WaitTime {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_samples_within(min: f64, max: f64) {
        let wait = WaitTime::between(min, max).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let lower = Duration::from_secs_f64(min);
        let upper = Duration::from_secs_f64(max);
        for _ in 0..1000 {
            let sampled = wait.sample(&mut rng);
            assert!(
                sampled >= lower && sampled <= upper,
                "{sampled:?} outside [{min}, {max}]"
            );
        }
    }

    #[test]
    fn samples_stay_within_bounds() {
        for (min, max) in [(0.0, 0.0), (0.0, 0.5), (1.0, 3.0), (2.0, 4.0), (2.5, 2.5), (0.1, 120.0)] {
            assert_samples_within(min, max);
        }
    }

    #[test]
    fn two_to_four_never_leaves_range() {
        let wait = WaitTime::between(2.0, 4.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let secs = wait.sample(&mut rng).as_secs_f64();
            assert!((2.0..=4.0).contains(&secs), "{secs}");
        }
    }

    #[test]
    fn samples_are_spread_across_range() {
        let wait = WaitTime::between(1.0, 3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let (mut low, mut high) = (0, 0);
        for _ in 0..1000 {
            let secs = wait.sample(&mut rng).as_secs_f64();
            if secs < 2.0 {
                low += 1;
            } else {
                high += 1;
            }
        }
        assert!(low > 350 && high > 350, "low={low} high={high}");
    }

    #[test]
    fn constant_always_returns_same_value() {
        let wait = WaitTime::constant(1.5).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(wait.sample(&mut rng), Duration::from_millis(1500));
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            WaitTime::between(3.0, 1.0),
            Err(DefinitionError::InvalidWaitBounds { .. })
        ));
    }

    #[test]
    fn rejects_negative_and_non_finite_bounds() {
        assert!(WaitTime::between(-1.0, 1.0).is_err());
        assert!(WaitTime::between(0.0, f64::INFINITY).is_err());
        assert!(WaitTime::between(f64::NAN, 1.0).is_err());
        assert!(WaitTime::constant(-0.5).is_err());
    }

    #[test]
    fn rejects_bounds_beyond_duration_range() {
        assert!(matches!(
            WaitTime::between(0.0, 1e20),
            Err(DefinitionError::InvalidWaitBounds { .. })
        ));
        assert!(WaitTime::constant(Duration::MAX.as_secs_f64()).is_err());
    }

    #[test]
    fn largest_accepted_bound_samples_without_panicking() {
        let wait = WaitTime::between(0.0, 1e18).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            assert!(wait.sample(&mut rng) <= Duration::from_secs_f64(1e18));
        }
    }
}
