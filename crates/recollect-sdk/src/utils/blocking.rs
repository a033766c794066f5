//! Bounded execution helpers.
//!
//! SQLite and model inference are blocking; both run on the blocking pool and
//! every wait is capped so a stuck backend surfaces as `Timeout`.

use std::future::Future;
use std::time::Duration;

use recollect_core::{Error, Result};

/// Await `future`, failing with `Error::Timeout` after `limit`.
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(operation, limit.as_millis() as u64)),
    }
}

/// Run a blocking closure on the blocking pool, bounded by `limit`.
///
/// On timeout the closure keeps running to completion in the background; the
/// caller just stops waiting for it.
pub async fn run_blocking<T, F>(operation: &str, limit: Duration, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    with_timeout(operation, limit, async move {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| Error::Other(format!("{} task failed: {}", operation, e)))?
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        let value = run_blocking("add", Duration::from_secs(1), || Ok(2 + 2)).await.unwrap();
        assert_eq!(value, 4);
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_error() {
        let err = run_blocking::<(), _>("fail", Duration::from_secs(1), || {
            Err(Error::storage_write("rejected"))
        })
        .await
        .unwrap_err();
        assert!(err.is_storage_write());
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let err = with_timeout("sleep", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("sleep"));
    }
}
