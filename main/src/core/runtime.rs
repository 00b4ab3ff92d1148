use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Decimal places used when formatting tensor values.
pub(crate) static DISPLAY_PRECISION: AtomicUsize = AtomicUsize::new(2);

/// Element count above which `Display` prints a summary instead of every value.
pub(crate) static DISPLAY_THRESHOLD: AtomicUsize = AtomicUsize::new(100);

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Run `f` with the calling thread's generator.
pub(crate) fn with_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// Runtime configuration for formatting and random number generation.
/// Takes effect once applied (via `apply()`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Decimal places when printing tensors (default 2).
    pub display_precision: usize,
    /// Tensors with more elements than this print as a summary (default 100).
    pub display_threshold: usize,
    /// Seed for the calling thread's generator used by `randn_`.
    /// `None` leaves the entropy-seeded generator in place.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            display_precision: 2,
            display_threshold: 100,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Apply this configuration.
    ///
    /// Display settings are global. The seed only reseeds the generator of
    /// the thread that calls `apply()`.
    pub fn apply(&self) -> Result<(), crate::api::error::TensorError> {
        DISPLAY_PRECISION.store(self.display_precision, Ordering::Relaxed);
        DISPLAY_THRESHOLD.store(self.display_threshold, Ordering::Relaxed);

        if let Some(seed) = self.seed {
            with_rng(|rng| *rng = StdRng::seed_from_u64(seed));
            log::debug!("[runtime] RNG seeded with {}", seed);
        }

        log::info!(
            "[runtime] display precision={} threshold={}",
            self.display_precision,
            self.display_threshold
        );
        Ok(())
    }

    /// The configuration currently in effect for display settings.
    pub fn current() -> Self {
        Self {
            display_precision: DISPLAY_PRECISION.load(Ordering::Relaxed),
            display_threshold: DISPLAY_THRESHOLD.load(Ordering::Relaxed),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.display_precision, 2);
        assert_eq!(config.display_threshold, 100);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let config = RuntimeConfig { seed: Some(7), ..RuntimeConfig::current() };
        config.apply().unwrap();
        let first: Vec<f64> = with_rng(|rng| (0..4).map(|_| rng.r#gen()).collect());
        config.apply().unwrap();
        let second: Vec<f64> = with_rng(|rng| (0..4).map(|_| rng.r#gen()).collect());
        assert_eq!(first, second);
    }
}
