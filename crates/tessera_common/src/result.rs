//! Common result and error types for the tessera toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in tessera), not a
/// problem with the user's input files. Input problems are either typed fatal
/// errors of the crate that detected them or recoverable diagnostics.
pub type TesseraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in tessera, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
