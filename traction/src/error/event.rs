//! Event dispatch error types

/// Failure reported by an event handler.
///
/// Returning this from a handler aborts delivery of the current emission to
/// every handler registered after it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a new handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EventError> for HandlerError {
    fn from(error: EventError) -> Self {
        Self::new(error.to_string())
    }
}

/// Errors raised while emitting an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// A handler failed; handlers after it were not invoked.
    #[error("Handler for '{event}' failed: {source}")]
    Handler {
        /// Name of the event being emitted.
        event: String,
        /// The handler's failure.
        source: HandlerError,
    },
}

impl EventError {
    /// Creates a new handler failure for `event`.
    pub fn handler(event: impl Into<String>, source: HandlerError) -> Self {
        Self::Handler {
            event: event.into(),
            source,
        }
    }

    /// Name of the event whose emission was aborted.
    pub fn event(&self) -> &str {
        match self {
            Self::Handler { event, .. } => event,
        }
    }
}
