//! Error types for listing repositories and pull requests.
//!
//! [`ForgeError`] is the closed classification a [`crate::Forge`] reports.
//! [`Error`] is what the aggregation pipeline surfaces to its caller, with
//! the account or repository the failure concerns attached.

/// Failure reported by a forge, classified by the remote status.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// Credential missing, invalid, or expired (HTTP 401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Resource does not exist or is hidden from the caller (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Access denied to an existing resource (HTTP 403).
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Anything else: other statuses, network or decoding failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fatal errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid or missing GitHub credentials ({0})")]
    Unauthorized(String),

    #[error("account '{account}' not found")]
    AccountNotFound { account: String },

    #[error("access to repository '{repo}' is forbidden")]
    RepoForbidden { repo: String },

    #[error("repository '{repo}' not found (was it deleted?)")]
    RepoNotFound { repo: String },

    /// Transport failures the pipeline does not translate.
    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for the listing pipeline.
pub type Result<T> = std::result::Result<T, Error>;
