use std::time::Duration;

use thiserror::Error;

/// Errors produced by the data-access layer.
///
/// "Capability absent" (the backend does not expose an optimized function)
/// is deliberately NOT a variant: collaborators express it as `Ok(None)` so
/// it can never be confused with a genuine failure. `Unavailable` exists
/// only for one-shot reads that have no fallback path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to parse API response: {0}")]
    Decode(String),

    #[error("fallback dataset too large: {rows} rows exceeds cap of {cap}")]
    DatasetTooLarge { rows: usize, cap: usize },

    #[error("backend function '{0}' is not available")]
    Unavailable(String),
}
