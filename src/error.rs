use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for the check-in core.
///
/// Transport-class failures (`Transport`, `Timeout`) are worded generically and
/// may be retried; `Remote` carries the service's own message verbatim since it
/// usually points at a data problem staff can fix.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure reaching the remote service.
    #[error("connection failed: {0}")]
    Transport(String),

    /// No response within the configured request timeout.
    #[error("request timed out")]
    Timeout,

    /// The remote service answered but reported an error.
    #[error("{0}")]
    Remote(String),

    /// Caught before any network call; the current step stays put.
    #[error("{0}")]
    Validation(String),

    /// Camera device could not be acquired or read.
    #[error("camera error: {0}")]
    Camera(String),
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout)
    }
}
