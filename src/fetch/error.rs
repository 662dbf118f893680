use thiserror::Error;

/// Failure reported by a [`FetchPort`](super::FetchPort) completion.
///
/// The controller only distinguishes two categories (see [`FetchError::is_connectivity`]);
/// the remaining variants exist so sources can say what actually went wrong in logs.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("No network connection")]
    NotConnected,
    #[error("Request cancelled")]
    Cancelled,
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// True when no network was reachable. Everything else is a generic failure.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, FetchError::NotConnected)
    }

    /// Cancellation is not a user-facing failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
