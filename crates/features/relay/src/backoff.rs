use brite_domain::config::RelayConfig;
use std::time::Duration;

/// Exponential delay between webhook attempts: `base * factor^(attempt - 1)`, capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    factor: u32,
    max: Duration,
}

impl Backoff {
    /// A `factor` below 1 is treated as 1; a `max` below `base` is raised to `base`.
    #[must_use]
    pub fn new(base: Duration, factor: u32, max: Duration) -> Self {
        Self { base, factor: factor.max(1), max: max.max(base) }
    }

    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.base_delay(), config.backoff_factor, config.max_delay())
    }

    /// Delay after the failed `attempt` (1-based). Never decreases as `attempt` grows.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let multiplier = self.factor.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base.checked_mul(multiplier).map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn doubles_until_capped() {
        let backoff = Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(5));
        let delays: Vec<u64> = (1..=5).map(|a| backoff.delay(a).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 5, 5]);
    }

    #[test]
    fn degenerate_settings_are_clamped() {
        let flat = Backoff::new(Duration::from_millis(250), 0, Duration::ZERO);
        assert_eq!(flat.delay(1), Duration::from_millis(250));
        assert_eq!(flat.delay(9), Duration::from_millis(250));
        assert_eq!(flat.delay(0), Duration::from_millis(250));
    }

    proptest! {
        #[test]
        fn delay_never_decreases(
            base_ms in 0_u64..10_000,
            factor in 0_u32..10,
            max_ms in 0_u64..600_000,
            attempt in 1_u32..64,
        ) {
            let backoff = Backoff::new(Duration::from_millis(base_ms), factor, Duration::from_millis(max_ms));
            let current = backoff.delay(attempt);
            let following = backoff.delay(attempt + 1);
            prop_assert!(following >= current);
            prop_assert!(following <= Duration::from_millis(max_ms.max(base_ms)));
        }
    }
}
