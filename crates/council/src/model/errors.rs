use std::time::Duration;
use thiserror::Error;

/// Why a single model query produced no answer.
///
/// Every variant is scoped to one model. The dispatcher never fails as a
/// whole; it records one of these per model and callers decide how much of
/// the cause to surface.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// No access token is configured for the backend.
    #[error("api key is not set")]
    CredentialMissing,

    /// Transport-level failure (DNS, connect, TLS, reset).
    #[error("network: {0}")]
    Network(String),

    /// The call did not complete within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("malformed response payload: {0}")]
    MalformedPayload(String),

    /// The payload parsed but carried no extractable text.
    #[error("no output text in response")]
    NoOutputText,

    /// The task running the query panicked or was cancelled.
    #[error("query task failed: {0}")]
    Task(String),
}
