use rand::{thread_rng, Rng};
use std::time::{Duration, Instant};

/// Exponential backoff with jitter for connection attempts
///
/// The connection threads never sleep on a backoff, they check `ready` each iteration and skip
/// the attempt until the wait has elapsed. That keeps them responsive to shutdown.
pub struct ExponentialBackoff {
    attempt: u8,
    max_timeout: Duration,
    use_max: bool,
    retry_at: Option<Instant>,
}

impl ExponentialBackoff {
    pub fn new(max_timeout: Duration) -> ExponentialBackoff {
        ExponentialBackoff {
            attempt: 0,
            max_timeout,
            use_max: false,
            retry_at: None,
        }
    }

    /// Whether the next attempt may be made
    pub fn ready(&self) -> bool {
        self.retry_at.map_or(true, |at| Instant::now() >= at)
    }

    /// Records a failed attempt. Returns true for the first failure after a success, which is
    /// when the connection should be considered lost.
    pub fn failed(&mut self) -> bool {
        let disconnected = self.attempt == 0;
        let wait = self.calculate_wait();
        self.retry_at = Some(Instant::now() + wait);
        self.attempt = self.attempt.saturating_add(1);
        disconnected
    }

    pub fn reset(&mut self) {
        self.use_max = false;
        self.attempt = 0;
        self.retry_at = None;
    }

    fn calculate_wait(&mut self) -> Duration {
        // Short circuit path if we're already at the point of reaching the max timeout
        if self.use_max {
            return self.max_timeout;
        }

        let random_delay = Duration::from_millis(thread_rng().gen_range(1..1000));
        let backoff_seconds = 2u64.pow(u32::from(self.attempt.min(16)));

        let delay = (Duration::from_secs(backoff_seconds) + random_delay).min(self.max_timeout);
        if delay == self.max_timeout {
            self.use_max = true;
        }

        delay
    }
}
