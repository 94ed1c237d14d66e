use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed measurements for the simulated day.
pub trait RandomSource: Send {
    /// Returns a value in `[lo, hi]`. Implementations return `lo` when the
    /// range is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;
}

/// [`RandomSource`] backed by `StdRng`.
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if lo >= hi {
            return lo;
        }
        self.0.random_range(lo..=hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_in_bounds() {
        let mut random = StdRandom::seeded(7);
        for _ in 0..1000 {
            let v = random.uniform(-20.0, 4.5);
            assert!((-20.0..=4.5).contains(&v));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = StdRandom::seeded(42);
        let mut b = StdRandom::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.uniform(0.0, 50.0), b.uniform(0.0, 50.0));
        }
    }

    #[test]
    fn test_degenerate_range_returns_lo() {
        let mut random = StdRandom::seeded(1);
        assert_eq!(random.uniform(3.0, 3.0), 3.0);
        assert_eq!(random.uniform(5.0, 1.0), 5.0);
    }
}
