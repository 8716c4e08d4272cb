//! Timeout wrapper for backend round trips
//!
//! Converts a hanging call into a typed `FetchError::Timeout` instead of an
//! indefinite spinner on the dashboard.

use std::future::Future;
use std::time::Duration;

use crate::shared::error::FetchError;

/// Default budget for a single backend round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Race a fallible future against a timer
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(duration)),
    }
}
