//! Binding layer errors

use lvport_core::PortError;
use thiserror::Error;

/// Errors raised while marshalling a script call into a native one
///
/// Every variant aborts the current call; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// Handle refers to an object that was deleted
    #[error("Stale handle: the {class} object was deleted")]
    StaleHandle { class: &'static str },

    /// Handle is of a different widget class than the function expects
    #[error("Wrong object class: expected {expected}, got {actual}")]
    WrongClass {
        expected: &'static str,
        actual: &'static str,
    },

    /// Integer does not fit the native parameter type
    #[error("Value {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    /// Script value has the wrong type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Wrong number of arguments
    #[error("{function} takes {expected} arguments, got {actual}")]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Function exists on the native side but cannot be exposed
    #[error("{namespace}.{name} is not supported: {reason}")]
    Unsupported {
        namespace: String,
        name: String,
        reason: &'static str,
    },

    /// No such function or attribute
    #[error("{namespace}.{name} not found")]
    NotFound { namespace: String, name: String },

    /// Driver-level failure surfaced through a module function
    #[error("Driver error: {0}")]
    Driver(String),
}

impl From<PortError> for BindingError {
    fn from(e: PortError) -> Self {
        BindingError::Driver(e.to_string())
    }
}

/// Result type for binding calls
pub type BindingResult<T> = std::result::Result<T, BindingError>;
