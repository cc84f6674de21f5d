//! Fixed-delay retry helper
//!
//! Each attempt is a full, independent execution of the operation; callers
//! use this only for naturally idempotent writes.

use std::time::Duration;

/// Retry an async operation up to `attempts` times with a fixed delay
/// between attempts. Returns the first success, or the final error once
/// the budget is exhausted.
pub async fn retry_fixed<F, Fut, T, E>(
    operation_name: &str,
    attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Operation failed, retry budget exhausted"
                    );
                    return Err(err);
                }

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, will retry after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let result: Result<i32, String> =
            retry_fixed("test_op", 3, Duration::ZERO, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let mut attempts = 0;
        let result: Result<i32, String> = retry_fixed("test_op", 3, Duration::ZERO, || {
            attempts += 1;
            let attempt = attempts;
            async move {
                if attempt < 3 {
                    Err("transient".to_string())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_and_returns_last_error() {
        let mut attempts = 0;
        let result: Result<i32, String> = retry_fixed("test_op", 3, Duration::ZERO, || {
            attempts += 1;
            async { Err("still broken".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "still broken");
        assert_eq!(attempts, 3);
    }
}
