//! Error types for the remote rendering endpoint.

/// Error from one remote render request.
///
/// These never abort a parse: the queue converts them into sentinel failure
/// outcomes local to one placeholder.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Response did not contain rendered output.
    #[error("empty render response")]
    EmptyResponse,
}
