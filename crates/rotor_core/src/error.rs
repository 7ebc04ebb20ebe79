//! Error types for the Rotor front end.

use thiserror::Error;

/// All errors that can be produced by the Rotor front end.
#[derive(Debug, Error)]
pub enum RotorError {
    /// A malformed token: an unterminated literal or comment, missing digits
    /// in a numeric literal, or an unexpected character.
    #[error("LexicalError: {message} at {position}")]
    Lexical {
        /// Short description of what went wrong.
        message: String,
        /// Byte offset of the offending token start.
        position: u32,
    },

    /// A grammar violation detected by the parser.
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// An internal contract violation that should not occur in normal
    /// operation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenient `Result` alias for fallible front-end operations.
pub type RotorResult<T> = Result<T, RotorError>;
