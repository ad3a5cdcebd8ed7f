//! Bounded-backoff retries for transient fetch failures.
//!
//! Only network-level failures are retried. Everything else — the
//! end-of-pagination signal, malformed opinions, selector problems — is
//! either not an error at all or not fixable by retrying, and propagates
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Returns `true` for transient conditions worth a backoff-and-retry.
///
/// Retriable: [`ScrapeError::Http`] (connection reset, timeout, TLS hiccup).
/// Everything else propagates immediately.
fn is_retriable(err: &ScrapeError) -> bool {
    matches!(err, ScrapeError::Http(_))
}

/// Executes `operation` with exponential backoff on transient errors.
///
/// Sleeps `backoff_base_secs * 2^attempt` seconds between attempts, up to
/// `max_retries` additional attempts after the first. With `max_retries = 3`
/// the operation runs at most 4 times. Non-retriable errors return without
/// sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }

                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    delay_secs,
                    error = %err,
                    "transient fetch failure, backing off before retry"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn returns_first_success_without_retrying() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ScrapeError>(7u32) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_retriable_error_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(3, 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ScrapeError::MalformedOpinion {
                    opinion_id: "1".to_owned(),
                    field: "usefulness",
                    reason: "bad".to_owned(),
                })
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(ScrapeError::MalformedOpinion { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pagination_limit_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(5, 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ScrapeError::PaginationLimit {
                    product_id: "100".to_owned(),
                    max_pages: 2,
                })
            }
        })
        .await;
        assert!(matches!(result, Err(ScrapeError::PaginationLimit { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
