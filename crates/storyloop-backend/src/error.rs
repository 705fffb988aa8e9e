use thiserror::Error;

/// Errors from a single backend call.
///
/// The loop's retry policy keys off this taxonomy: auth failures are never
/// retried, transient failures and empty responses are retried once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transient backend failure: {0}")]
    Transient(String),

    #[error("Backend returned no usable text")]
    Empty,
}

impl BackendError {
    /// Whether a single in-stage retry is allowed for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Transient(_) | BackendError::Empty)
    }

    /// Classify an HTTP status into the retry taxonomy.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => BackendError::Auth(format!("API error {}: {}", status, body)),
            408 | 429 => BackendError::Transient(format!("API error {}: {}", status, body)),
            s if s >= 500 => BackendError::Transient(format!("API error {}: {}", s, body)),
            s => BackendError::Transient(format!("Unexpected API error {}: {}", s, body)),
        }
    }
}
