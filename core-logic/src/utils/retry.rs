use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Bounded retry policy with a geometric backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 2000,
            multiplier: 1.5,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms,
            ..Default::default()
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay slept after the failed attempt `attempt` (0-based):
    /// `initial_backoff_ms * multiplier^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_backoff_ms as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(delay_ms.round() as u64)
    }

    /// Every delay the policy will sleep when all attempts fail.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for_attempt(attempt))
            .collect()
    }
}

/// Runs `operation` until it succeeds or the attempt budget is spent.
///
/// The last error is returned unmodified. Errors for which `retryable` returns
/// false are returned immediately.
pub async fn with_retry<T, E, F, Fut, R>(
    config: RetryConfig,
    operation_name: &str,
    retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt + 1 >= max_attempts || !retryable(&e) {
                    debug!(
                        "{} failed after {} attempt(s): {}",
                        operation_name,
                        attempt + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                debug!(
                    "{} failed (attempt {}/{}). Retrying in {:?}: {}",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    delay,
                    e
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let config = RetryConfig::default();
        assert_eq!(
            config.schedule(),
            vec![Duration::from_millis(2000), Duration::from_millis(3000)]
        );
    }

    #[test]
    fn test_delay_is_pure_function_of_attempt() {
        let config = RetryConfig::new(5, 2000);
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(4500));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(6750));
        assert_eq!(config.delay_for_attempt(2), config.delay_for_attempt(2));
    }

    #[test]
    fn test_single_attempt_has_no_delays() {
        assert!(RetryConfig::new(1, 2000).schedule().is_empty());
    }
}
