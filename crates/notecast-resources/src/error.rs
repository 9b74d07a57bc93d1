//! Error types for resource handling.

/// Error from the upload service.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
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

    /// Upload was accepted but the response carried an error code.
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// I/O error reading the local file.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
