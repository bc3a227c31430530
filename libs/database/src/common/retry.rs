use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for caller-side retries of start-up work (connect + schema bootstrap).
///
/// Connectors never retry internally; callers wrap whatever sequence they want
/// repeated with [`retry_with_backoff`] or [`retry_if`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first attempt)
    pub max_retries: u32,

    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (typically 2.0)
    pub backoff_multiplier: f64,

    /// Whether to add jitter to prevent thundering herd
    pub use_jitter: bool,
}

impl RetryConfig {
    /// Defaults: 3 retries, 100ms initial delay, 5s cap, x2 backoff, jitter on
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay before retry number `attempt` (1-based), before jitter
    fn delay_for(&self, attempt: u32) -> u64 {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        ((self.initial_delay_ms as f64 * factor) as u64).min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Retry an async operation with exponential backoff while `should_retry` accepts the error.
///
/// Errors rejected by `should_retry` are returned immediately.
pub async fn retry_if<F, Fut, T, E, P>(
    mut operation: F,
    config: RetryConfig,
    mut should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnMut(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(retries = attempt, "Operation succeeded after retries");
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    warn!(error = %e, "Operation failed with a non-retryable error");
                    return Err(e);
                }

                attempt += 1;
                if attempt > config.max_retries {
                    warn!(attempts = attempt, error = %e, "Operation failed, giving up");
                    return Err(e);
                }

                let delay = config.delay_for(attempt);
                let delay = if config.use_jitter {
                    apply_jitter(delay)
                } else {
                    delay
                };

                warn!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay,
                    error = %e,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }
    }
}

/// Retry an async operation with exponential backoff on every error
pub async fn retry_with_backoff<F, Fut, T, E>(operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_if(operation, config, |_| true).await
}

/// Retry with the default configuration
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}

/// Random value between 50% and 100% of the delay
fn apply_jitter(delay: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let random_factor =
        (RandomState::new().hash_one(std::time::SystemTime::now()) % 50) as f64 / 100.0 + 0.5;

    (delay as f64 * random_factor) as u64
}
