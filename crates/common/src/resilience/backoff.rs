//! Exponential backoff with jitter for network retries

use std::time::Duration;

use rand::Rng;

/// Default floor between attempts.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);
/// Default ceiling between attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Sleep schedule between retries.
///
/// The delay before retry `n` (zero-based) is `floor + floor * n^2`, clipped
/// to the ceiling, then reduced by a uniform jitter of up to a quarter of
/// itself and raised back to the floor if the jitter pushed it below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkBackoff {
    floor: Duration,
    ceiling: Duration,
    sleep_enabled: bool,
}

impl Default for NetworkBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl NetworkBackoff {
    /// Creates a schedule. A ceiling below the floor is raised to the floor.
    #[must_use]
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        Self { floor, ceiling: ceiling.max(floor), sleep_enabled: true }
    }

    /// Turns sleeping on or off. With sleeping off every delay is zero,
    /// which keeps retry tests fast and deterministic.
    #[must_use]
    pub const fn with_sleep(mut self, enabled: bool) -> Self {
        self.sleep_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn floor(&self) -> Duration {
        self.floor
    }

    #[must_use]
    pub const fn ceiling(&self) -> Duration {
        self.ceiling
    }

    #[must_use]
    pub const fn sleep_enabled(&self) -> bool {
        self.sleep_enabled
    }

    /// Delay before jitter.
    #[must_use]
    pub fn base_delay(&self, retries: u32) -> Duration {
        let factor = retries.saturating_mul(retries);
        self.floor.saturating_add(self.floor.saturating_mul(factor)).min(self.ceiling)
    }

    /// Jittered delay to sleep before retry number `retries`.
    #[must_use]
    pub fn delay(&self, retries: u32) -> Duration {
        if !self.sleep_enabled {
            return Duration::ZERO;
        }

        let delay = self.base_delay(retries);
        let quarter = u64::try_from((delay / 4).as_nanos()).unwrap_or(u64::MAX);
        let jitter = if quarter == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(rand::thread_rng().gen_range(0..quarter))
        };

        delay.saturating_sub(jitter).max(self.floor)
    }
}
