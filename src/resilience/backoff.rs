//! Delay between attempts.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the pause between two attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayStrategy {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Doubling delay, capped, with up to 10% jitter.
    Exponential,
}

/// Delay to wait before retry number `retry` (1 = first retry).
pub fn delay_before(strategy: DelayStrategy, retry: u32, base: Duration, max: Duration) -> Duration {
    if retry == 0 || base.is_zero() {
        return Duration::ZERO;
    }

    match strategy {
        DelayStrategy::Fixed => base,
        DelayStrategy::Exponential => exponential_with_jitter(retry, base, max),
    }
}

fn exponential_with_jitter(retry: u32, base: Duration, max: Duration) -> Duration {
    let base_ms = base.as_millis().min(u64::MAX as u128) as u64;
    let max_ms = max.as_millis().min(u64::MAX as u128) as u64;

    let factor = 2u64.saturating_pow(retry - 1);
    let capped = base_ms.saturating_mul(factor).min(max_ms.max(base_ms));

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_is_constant() {
        let base = Duration::from_millis(250);
        let max = Duration::from_secs(10);
        for retry in 1..6 {
            assert_eq!(delay_before(DelayStrategy::Fixed, retry, base, max), base);
        }
    }

    #[test]
    fn test_zero_delay_never_sleeps() {
        let d = delay_before(DelayStrategy::Exponential, 4, Duration::ZERO, Duration::from_secs(1));
        assert_eq!(d, Duration::ZERO);
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(1000);

        let d1 = delay_before(DelayStrategy::Exponential, 1, base, max);
        assert!(d1.as_millis() >= 100 && d1.as_millis() < 110);

        let d2 = delay_before(DelayStrategy::Exponential, 2, base, max);
        assert!(d2.as_millis() >= 200 && d2.as_millis() < 220);

        let capped = delay_before(DelayStrategy::Exponential, 12, base, max);
        assert!(capped.as_millis() >= 1000 && capped.as_millis() < 1100);
    }
}
