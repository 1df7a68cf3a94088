//! Test helper utilities and common testing patterns

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Async wait utilities.
///
/// Time is measured with the tokio clock so the helpers also work inside
/// `start_paused` tests.
pub struct TestEnv;

impl TestEnv {
    /// Wait for a condition to be true with timeout
    pub async fn wait_for<F, Fut>(condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        Self::wait_for_with_interval(condition, timeout, Duration::from_millis(10)).await
    }

    /// Wait for a condition with a custom poll interval
    pub async fn wait_for_with_interval<F, Fut>(
        mut condition: F,
        timeout: Duration,
        poll_interval: Duration,
    ) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(poll_interval).await;
        }

        condition().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_for_success() {
        let mut counter = 0;
        let condition = || {
            counter += 1;
            let done = counter >= 3;
            async move { done }
        };

        let result = TestEnv::wait_for(condition, Duration::from_millis(500)).await;
        assert!(result);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_timeout() {
        let condition = || async { false };
        let result = TestEnv::wait_for(condition, Duration::from_secs(30)).await;
        assert!(!result);
    }
}
