//! Error types for glsync-gitlab.

use thiserror::Error;

/// All errors that can arise from remote discovery.
#[derive(Debug, Error)]
pub enum GitlabError {
    /// The HTTP request itself failed (transport, TLS, non-2xx status).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The response body could not be read or decoded as JSON.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured root group does not exist (or the token cannot see it).
    #[error("group '{path}' not found")]
    GroupNotFound { path: String },
}
