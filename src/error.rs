use std::result::Result as StdResult;

use thiserror::Error;

/// The type returned by rematch methods.
pub type Result<T> = StdResult<T, Error>;

/// Matcher adapter error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The pattern was rejected by the backend compiler.
    ///
    /// Carries the backend's diagnostic text verbatim.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Flag bits the backend does not define.
    #[error("unsupported flag bits: {0:#x}")]
    UnsupportedFlags(u32),

    /// Invalid flag letter code
    #[error("invalid pattern flag: {0}")]
    InvalidFlag(char),

    /// The replacement template is malformed: a trailing backslash, or a `$`
    /// not followed by an in-range group index.
    #[error("malformed template: {0}")]
    MalformedTemplate(String),
}
