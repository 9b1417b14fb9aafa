//! Reconnect delay policy for the push channel.

use std::time::Duration;

/// First reconnect delay, and the delay after every successful open.
pub const DEFAULT_RECONNECT_FLOOR_MS: u64 = 1_000;
/// Upper bound the doubling delay is capped at.
pub const DEFAULT_RECONNECT_CEILING_MS: u64 = 30_000;

/// Exponential reconnect delay for the push channel.
///
/// The first delay handed out after a [`reset`](Self::reset) is the floor;
/// each subsequent call doubles it until the ceiling is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectBackoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    /// A ceiling below the floor is raised to the floor.
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(floor);
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// [`new`](Self::new) with both bounds in milliseconds.
    pub fn from_millis(floor_ms: u64, ceiling_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(floor_ms),
            Duration::from_millis(ceiling_ms),
        )
    }

    /// Delay to wait before the next attempt. Advances the policy.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        delay
    }

    /// Delay the next call to [`next_delay`](Self::next_delay) will return.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Called on every successful open.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// Delay handed out first and after every reset.
    pub fn floor(&self) -> Duration {
        self.floor
    }

    /// Largest delay ever handed out.
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::from_millis(
            DEFAULT_RECONNECT_FLOOR_MS,
            DEFAULT_RECONNECT_CEILING_MS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(backoff: &mut ReconnectBackoff, n: usize) -> Vec<u128> {
        (0..n).map(|_| backoff.next_delay().as_millis()).collect()
    }

    #[test]
    fn doubles_up_to_ceiling() {
        let mut backoff = ReconnectBackoff::default();
        assert_eq!(
            millis(&mut backoff, 8),
            vec![1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000]
        );
    }

    #[test]
    fn reset_returns_to_floor() {
        let mut backoff = ReconnectBackoff::default();
        millis(&mut backoff, 4);
        assert_eq!(backoff.current(), Duration::from_millis(16_000));

        backoff.reset();
        assert_eq!(millis(&mut backoff, 2), vec![1000, 2000]);
    }

    #[test]
    fn ceiling_is_never_below_floor() {
        let mut backoff = ReconnectBackoff::from_millis(500, 100);
        assert_eq!(backoff.ceiling(), Duration::from_millis(500));
        assert_eq!(millis(&mut backoff, 3), vec![500, 500, 500]);
    }
}
