//! Fetch error types

use super::EventError;

/// Errors that can occur while fetching a model or collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The resource has no endpoint to fetch from.
    #[error("No endpoint configured")]
    NoEndpoint,

    /// The transport could not complete the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Applying the fetched data triggered a failing handler.
    #[error(transparent)]
    Event(#[from] EventError),
}

impl FetchError {
    /// Creates a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a new malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
