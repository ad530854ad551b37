//! Reconnect backoff schedule.
//!
//! Delays double from [`BACKOFF_FLOOR`] up to [`BACKOFF_CEILING`]. Each delay
//! is jittered uniformly between the floor and its ceiling so that replicas
//! losing the store at the same moment do not reconnect in lockstep.

use rand::Rng;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

pub const BACKOFF_FACTOR: u64 = 2;
pub const BACKOFF_FLOOR: Duration = Duration::from_millis(100);
pub const BACKOFF_CEILING: Duration = Duration::from_secs(1);

/// Un-jittered upper bound of each successive delay.
pub fn delay_ceilings() -> impl Iterator<Item = Duration> {
    // ExponentialBackoff yields base^n * factor: 2 * 50 = 100ms, 200ms, 400ms, ...
    ExponentialBackoff::from_millis(BACKOFF_FACTOR)
        .factor(BACKOFF_FLOOR.as_millis() as u64 / BACKOFF_FACTOR)
        .max_delay(BACKOFF_CEILING)
}

/// Delays to sleep between `max_attempts` connection attempts.
///
/// Yields `max_attempts - 1` values: the first attempt is immediate.
pub fn reconnect_delays(max_attempts: usize) -> impl Iterator<Item = Duration> {
    delay_ceilings()
        .map(jitter)
        .take(max_attempts.saturating_sub(1))
}

fn jitter(ceiling: Duration) -> Duration {
    let floor = BACKOFF_FLOOR.as_millis() as u64;
    let ceiling = ceiling.as_millis() as u64;

    if ceiling <= floor {
        return BACKOFF_FLOOR;
    }

    Duration::from_millis(rand::rng().random_range(floor..=ceiling))
}
