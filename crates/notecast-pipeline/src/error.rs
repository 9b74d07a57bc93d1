//! Pipeline error types.

use crate::tree::Kind;

/// Parse-fatal error.
///
/// Any error surfaced here aborts the whole parse for the destination; the
/// caller substitutes a diagnostic page rather than committing partial
/// output. Failures local to one fragment (remote jobs, missing resources)
/// never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An extension hook failed.
    #[error("extension '{extension}' failed: {message}")]
    Extension {
        /// Extension name.
        extension: &'static str,
        /// Failure description.
        message: String,
    },

    /// Two extensions claim the same node kind.
    #[error("node kind {kind:?} claimed by both '{first}' and '{second}'")]
    RendererConflict {
        /// Conflicting kind tag.
        kind: Kind,
        /// Extension registered first.
        first: &'static str,
        /// Extension registered second.
        second: &'static str,
    },
}

impl PipelineError {
    /// Convenience constructor for extension hook failures.
    #[must_use]
    pub fn extension(extension: &'static str, message: impl Into<String>) -> Self {
        Self::Extension {
            extension,
            message: message.into(),
        }
    }
}
