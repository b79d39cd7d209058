//! Error types for endpoint specifier parsing.

use thiserror::Error;

/// Errors that can occur when parsing an endpoint specifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddrError {
    /// The specifier string is empty.
    #[error("endpoint specifier cannot be empty")]
    Empty,

    /// The specifier is not a valid URL, bare port, or host:port string.
    #[error("invalid endpoint specifier '{spec}': {reason}")]
    InvalidSpecifier { spec: String, reason: String },

    /// The specifier parsed but carries no host to connect or bind to.
    #[error("endpoint specifier '{spec}' has no host")]
    MissingHost { spec: String },
}
