//! Retrying transient failures.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::{debug, warn};
use tokio_retry::RetryIf;

use crate::error_handling::{get_retry_strategy, Retriable};

/// Re-runs `op` while it fails with a retriable error.
///
/// `strategy` yields the delay before each retry; once it is exhausted the
/// last error is returned. Permanent errors are returned after the first
/// attempt.
pub async fn retry_on_failure<S, F, Fut, T, E>(strategy: S, mut op: F) -> Result<T, E>
where
    S: IntoIterator<Item = Duration>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retriable + fmt::Display,
{
    let attempt = AtomicU32::new(0);

    RetryIf::start(
        strategy,
        || {
            attempt.fetch_add(1, Ordering::Relaxed);
            op()
        },
        |error: &E| {
            if error.is_retriable() {
                warn!(
                    "Attempt {} failed, retrying: {error}",
                    attempt.load(Ordering::Relaxed)
                );
                true
            } else {
                debug!(
                    "Attempt {} failed with a permanent error: {error}",
                    attempt.load(Ordering::Relaxed)
                );
                false
            }
        },
    )
    .await
}

/// [`retry_on_failure`] with the default backoff.
pub async fn retry_with_backoff<F, Fut, T, E>(op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retriable + fmt::Display,
{
    retry_on_failure(get_retry_strategy(), op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::QueryError;
    use std::cell::Cell;
    use tokio_retry::strategy::FixedInterval;

    fn transient() -> QueryError {
        QueryError::SqlError(sqlx::Error::PoolTimedOut)
    }

    fn fast(attempts: usize) -> impl Iterator<Item = Duration> {
        FixedInterval::from_millis(1).take(attempts)
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = Cell::new(0);
        let result = retry_on_failure(fast(5), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(transient())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_on_permanent_error() {
        let calls = Cell::new(0);
        let result: Result<(), QueryError> = retry_on_failure(fast(5), || {
            calls.set(calls.get() + 1);
            async {
                Err(QueryError::Decode {
                    column: "age",
                    message: "not a decimal".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(QueryError::Decode { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let calls = Cell::new(0);
        let result: Result<(), QueryError> = retry_on_failure(fast(2), || {
            calls.set(calls.get() + 1);
            async { Err(transient()) }
        })
        .await;

        assert!(matches!(
            result,
            Err(QueryError::SqlError(sqlx::Error::PoolTimedOut))
        ));
        // First attempt plus one per delay
        assert_eq!(calls.get(), 3);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_retry_future_is_send() {
        let future = retry_with_backoff(|| async { Ok::<_, QueryError>(()) });
        assert_send(&future);
    }
}
