//! Registry error types

use thiserror::Error;

/// Errors raised by [`EventRegistry`](crate::EventRegistry) operations
#[derive(Error, Debug)]
pub enum ObservableError {
    /// The event has no registered handlers
    #[error("no handlers registered for event '{event}'")]
    NoHandlerFound { event: String },

    /// The handler is not registered for the event
    #[error("handler {handler} is not registered for event '{event}'")]
    HandlerNotFound { event: String, handler: String },

    /// A handler failed during dispatch; the handler's own error is kept as-is
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl ObservableError {
    /// Returns true for the "nothing is listening" case
    pub fn is_no_handler_found(&self) -> bool {
        matches!(self, ObservableError::NoHandlerFound { .. })
    }

    /// Name of the event this error refers to, if any
    pub fn event(&self) -> Option<&str> {
        match self {
            ObservableError::NoHandlerFound { event }
            | ObservableError::HandlerNotFound { event, .. } => Some(event),
            ObservableError::Handler(_) => None,
        }
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, ObservableError>;
