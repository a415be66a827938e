//! Error types for the fetch/parse pipeline.
//!
//! [`FetchError`] is what a single HTTP request can fail with.  [`LoadError`]
//! is the reason carried by a failed load cycle and is what the UI turns into
//! an empty-state message.  Both are `Clone + PartialEq` so load outcomes can
//! be passed across the worker channel and compared in tests.

use thiserror::Error;

/// Failure of one GET against the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with something other than `200 OK`.
    #[error("server responded with HTTP {0}")]
    BadStatus(u16),

    /// Connection refused, timeout, or the body stream broke.
    #[error("I/O failure: {0}")]
    IoFailure(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::IoFailure(err.to_string())
    }
}

/// Why a load cycle ended in `LoadResult::Failure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The connectivity check reported no usable network; nothing was fetched.
    #[error("no internet connection")]
    NoConnectivity,

    #[error("server responded with HTTP {0}")]
    BadStatus(u16),

    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// The body was not the expected JSON envelope and no article survived.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<FetchError> for LoadError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::BadStatus(code) => LoadError::BadStatus(code),
            FetchError::IoFailure(cause) => LoadError::IoFailure(cause),
        }
    }
}
