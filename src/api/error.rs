use thiserror::Error;

/// Client-observable failures from the interview backend.
///
/// Callers branch on these: `Exhausted` is a normal termination signal for
/// the question cursor, `Unauthorized` means the credential must be renewed,
/// and everything else is surfaced without advancing the session.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bearer credential missing or expired (HTTP 401).
    #[error("authentication required or expired")]
    Unauthorized,

    /// No further questions exist for this interview (HTTP 410).
    #[error("no more questions for this interview")]
    Exhausted,

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected the request (other 4xx).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The backend failed (5xx).
    #[error("backend error (HTTP {status})")]
    Server { status: u16 },

    /// Connection, timeout, or response decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// True for the distinguished "no more questions" signal.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ApiError::Exhausted)
    }

    /// True when the caller should re-authenticate before retrying.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
