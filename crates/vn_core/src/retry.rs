use std::future::Future;
use std::time::{Duration, Instant};
use rand::Rng;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};
use crate::error::{Error, Stage};
use crate::Result;

/// Timeout and bounded retry applied to every outbound call.
///
/// Each attempt is cut off after `timeout`. Retryable failures back off
/// `base_delay * 2^(attempt-1)` capped at `max_delay`, plus up to 250ms of
/// jitter. After `max_retries` retries the last error is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub timeout: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            timeout: Duration::from_secs(30),
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries,
            timeout,
            ..Self::default()
        }
    }

    /// A single attempt, still bounded by the timeout.
    pub fn no_retry(timeout: Duration) -> Self {
        Self::new(0, timeout)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter_ms: u64 = rand::thread_rng().gen_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }

    pub async fn run<T, F, Fut>(&self, stage: Stage, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            let outcome = match timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(Error::timed_out(
                    stage,
                    format!("no response within {}s", self.timeout.as_secs_f32()),
                )),
            };

            match outcome {
                Ok(value) => {
                    debug!(%stage, attempt, elapsed_ms = started.elapsed().as_millis() as u64, "call succeeded");
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(%stage, attempt, max = self.max_retries, ?delay, error = %e, "call failed; backing off");
                    sleep(delay).await;
                }
                Err(e) => {
                    if e.is_retryable() {
                        error!(%stage, attempts = attempt + 1, elapsed_ms = started.elapsed().as_millis() as u64, error = %e, "call exhausted retries");
                    }
                    return Err(e);
                }
            }
        }
    }
}
