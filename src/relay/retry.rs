//! Caller-side retry for transient connection faults
//!
//! Wraps a whole upload or probe. A connection fault happens before any
//! directory or byte operation, so repeating the call has no duplicated
//! side effects on the share.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use super::error::RelayError;

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one
    pub max_retries: usize,

    /// Initial backoff duration in seconds
    pub initial_backoff_secs: f64,

    /// Backoff multiplier for each retry
    pub backoff_multiplier: f64,

    /// Maximum backoff duration in seconds
    pub max_backoff_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_secs: 1.0,
            backoff_multiplier: 2.0,
            max_backoff_secs: 30.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set custom backoff parameters
    pub fn with_backoff(mut self, initial_secs: f64, multiplier: f64, max_secs: f64) -> Self {
        self.initial_backoff_secs = initial_secs;
        self.backoff_multiplier = multiplier;
        self.max_backoff_secs = max_secs;
        self
    }
}

/// Upper bound for any single backoff, whatever the configuration says
pub const BACKOFF_CEILING_SECS: f64 = 60.0 * 60.0;

/// Calculate backoff delay for a given retry attempt (exponential backoff)
///
/// Non-finite or out-of-range settings clamp to `[0, BACKOFF_CEILING_SECS]`.
pub fn calculate_backoff(attempt: usize, config: &RetryConfig) -> Duration {
    let cap = if config.max_backoff_secs.is_nan() {
        BACKOFF_CEILING_SECS
    } else {
        config.max_backoff_secs.clamp(0.0, BACKOFF_CEILING_SECS)
    };

    let attempt = i32::try_from(attempt).unwrap_or(i32::MAX);
    let delay_secs = config.initial_backoff_secs * config.backoff_multiplier.powi(attempt);
    let delay_secs = if delay_secs.is_nan() {
        cap
    } else {
        delay_secs.clamp(0.0, cap)
    };

    Duration::from_secs_f64(delay_secs)
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent. The last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(
    label: &str,
    config: &RetryConfig,
    operation: F,
) -> Result<T, RelayError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RelayError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!("{} succeeded after {} retries", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && e.is_transient() => {
                let delay = calculate_backoff(attempt, config);
                info!(
                    "{} attempt {}/{} failed, retrying in {:?}: {}",
                    label,
                    attempt + 1,
                    config.max_retries + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    warn!("{} failed after {} attempts: {}", label, attempt + 1, e);
                } else {
                    warn!("{} failed with non-retryable error: {}", label, e);
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryConfig {
        RetryConfig::new(3).with_backoff(0.0, 2.0, 0.0)
    }

    #[test]
    fn test_calculate_backoff() {
        let config = RetryConfig::default();

        assert_eq!(calculate_backoff(0, &config), Duration::from_secs(1));
        assert_eq!(calculate_backoff(1, &config), Duration::from_secs(2));
        assert_eq!(calculate_backoff(2, &config), Duration::from_secs(4));

        // Caps at max_backoff_secs
        assert_eq!(calculate_backoff(5, &config), Duration::from_secs(30));
    }

    #[test]
    fn test_calculate_backoff_fractional() {
        let config = RetryConfig::new(5).with_backoff(0.5, 3.0, 10.0);

        assert_eq!(calculate_backoff(0, &config), Duration::from_millis(500));
        assert_eq!(calculate_backoff(1, &config), Duration::from_millis(1500));
        assert_eq!(calculate_backoff(3, &config), Duration::from_secs(10));
    }

    #[test]
    fn test_calculate_backoff_out_of_range_settings() {
        let ceiling = Duration::from_secs_f64(BACKOFF_CEILING_SECS);

        let config = RetryConfig::new(3).with_backoff(1.0, 2.0, 1e30);
        assert_eq!(calculate_backoff(70, &config), ceiling);
        assert_eq!(calculate_backoff(usize::MAX, &config), ceiling);

        let config = RetryConfig::new(3).with_backoff(1.0, f64::INFINITY, f64::INFINITY);
        assert_eq!(calculate_backoff(1, &config), ceiling);

        let config = RetryConfig::new(3).with_backoff(f64::NAN, 2.0, 5.0);
        assert_eq!(calculate_backoff(0, &config), Duration::from_secs(5));

        let config = RetryConfig::new(3).with_backoff(-1.0, 2.0, -5.0);
        assert_eq!(calculate_backoff(2, &config), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_retries_transient_connection_fault() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result = with_retry("upload", &fast(), || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RelayError::Connection("Connection refused".into()))
                } else {
                    Ok(7u64)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<(), _> = with_retry("upload", &fast(), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RelayError::Connection("Connection timed out".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_conflict_and_storage_are_not_retried() {
        for error in [
            RelayError::PathConflict("Remote file already exists: a.txt".into()),
            RelayError::Storage("Failed to store a.txt on docs: timeout".into()),
            RelayError::Connection("Authentication failed: NT_STATUS_LOGON_FAILURE".into()),
        ] {
            let calls = Arc::new(AtomicUsize::new(0));
            let result: Result<(), _> = with_retry("upload", &fast(), || {
                let calls = calls.clone();
                let error = error.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(error)
                }
            })
            .await;

            assert_eq!(result, Err(error));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }
}
