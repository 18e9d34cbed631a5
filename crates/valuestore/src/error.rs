//! Error types for valuestore

use std::fmt;
use std::io;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store and cache operations
///
/// A missing key is never an error; lookups return `Ok(None)` instead.
#[derive(Debug)]
pub enum Error {
    /// I/O error from a file-backed store
    Io(io::Error),

    /// Corrupt or unreadable store contents
    Parse(String),

    /// Operation not possible with the current configuration
    /// (e.g. a write against a chain with no primary store)
    Configuration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        Error::Parse(format!("{:?}", err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Parse(format!("invalid UTF-8: {}", err))
    }
}
