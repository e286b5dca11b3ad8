//! Transparent retry of remote calls

use cleanledger_config::RetryConfig;
use std::future::Future;

use crate::error::CoreResult;

/// Retries a failed call a fixed number of times before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 1 }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self { retries }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.retries)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Run `call`, retrying retryable failures; the last error is returned
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> CoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    log::warn!(
                        target: "cleanledger::retry",
                        "{} failed ({}), retry {}/{}",
                        operation,
                        error,
                        attempt,
                        self.retries
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }
}
