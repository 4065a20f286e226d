use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::constants::{MAX_ATTEMPTS, RETRY_BACKOFF};
use crate::error::Result;

/// Fixed attempt cap with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Runs `op` until it succeeds or the attempt cap is reached, returning the
    /// last error on exhaustion. `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    warn!("Attempt {}/{}: {} failed: {}", attempt, self.max_attempts, label, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Attempt {}/{}: {} failed: {}", attempt, self.max_attempts, label, e);
                    sleep(self.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, RETRY_BACKOFF)
    }
}
