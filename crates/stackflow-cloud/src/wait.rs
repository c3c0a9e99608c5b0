//! Polling with exponential backoff

use crate::error::{ClientError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Backoff settings for "and wait" operations
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Delay before the second poll
    pub initial_delay: Duration,

    /// Upper bound for a single delay
    pub max_delay: Duration,

    /// Backoff multiplier
    pub multiplier: f64,

    /// Total budget for one wait
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            multiplier: 1.5,
            timeout: Duration::from_secs(60 * 60),
        }
    }
}

impl WaitConfig {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Poll `check` until it yields a value.
///
/// `Ok(None)` means "not done yet". Transient errors are logged and polled
/// through; any other error ends the wait. Exceeding `config.timeout` fails
/// with [`ClientError::Timeout`].
pub async fn poll_until<T, F, Fut>(stack_name: &str, config: &WaitConfig, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    let mut attempt = 0u32;

    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(ClientError::Transient(message)) => {
                debug!(stack = %stack_name, attempt, "Transient error while waiting: {}", message);
            }
            Err(e) => return Err(e),
        }

        let waited = started.elapsed();
        if waited >= config.timeout {
            return Err(ClientError::Timeout {
                stack: stack_name.to_string(),
                waited,
            });
        }

        let delay = config.delay_for_attempt(attempt).min(config.timeout - waited);
        sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}
