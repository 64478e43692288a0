//! # Error Types
//!
//! Parse errors for the textual forms of the shared primitives.

use thiserror::Error;

/// Errors produced when parsing an [`Address`](crate::Address) or
/// [`TokenId`](crate::TokenId) from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length did not match the expected width.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input was not a valid unsigned integer.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),
}
