use std::time::Duration;

/// Exponential backoff timer for reconnect attempts.
///
/// Each call to [`next_delay`](Backoff::next_delay) returns the current delay
/// and grows it by the multiplier up to the cap. Any successful poll of the
/// event loop resets the timer.
#[derive(Debug)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            initial,
            max,
            multiplier,
            current: initial,
        }
    }

    /// Returns the delay to wait before the next reconnect attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let grown = self.current.mul_f64(self.multiplier);
        self.current = grown.min(self.max);
        delay
    }

    /// Resets the delay to its initial value.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 2.0, Duration::from_secs(30))
    }
}
