//! Error taxonomy for function invocation.
//!
//! Every failure surfaces to the caller; nothing is retried or recovered
//! locally. The transport maps each variant to a status code through
//! [`InvocationError::status_code`].

use std::any::Any;
use thiserror::Error;

/// Failure raised while resolving, converting or executing a function.
///
/// `Clone` is required because a cached element sequence replays failed
/// elements to every cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// No transform, sink or source is attached to the request.
    #[error("no such function: {path}")]
    NoSuchFunction {
        /// Request path that failed to resolve
        path: String,
    },

    /// A GET request reached a transform without a literal argument.
    #[error("function '{function}' requires an argument")]
    MissingArgument {
        /// Name of the resolved function
        function: String,
    },

    /// The literal argument could not be converted to the declared input type.
    #[error("cannot convert '{value}' to {expected}")]
    Conversion {
        /// Declared element kind
        expected: String,
        /// Literal as received
        value: String,
    },

    /// The handler failed while producing or consuming elements.
    #[error("function execution failed: {0}")]
    Execution(String),

    /// The sink coroutine could not be started.
    #[error("failed to start consumer: {0}")]
    Spawn(String),
}

impl InvocationError {
    /// Build an execution failure from any displayable error.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        InvocationError::Execution(err.to_string())
    }

    /// True for failures caused by the request rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InvocationError::NoSuchFunction { .. }
                | InvocationError::MissingArgument { .. }
                | InvocationError::Conversion { .. }
        )
    }

    /// HTTP status the transport should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            InvocationError::NoSuchFunction { .. }
            | InvocationError::MissingArgument { .. }
            | InvocationError::Conversion { .. } => 400,
            InvocationError::Execution(_) => 500,
            InvocationError::Spawn(_) => 503,
        }
    }

    /// Execution failure carrying the message of a caught handler panic.
    pub fn from_panic(panic: &(dyn Any + Send)) -> Self {
        InvocationError::Execution(format!("handler panicked: {}", panic_message(panic)))
    }
}

/// Text of a panic payload; `panic!` produces `&str` or `String`.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
