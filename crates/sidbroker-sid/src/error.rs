//! Error types for sidbroker-sid.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, SidError>;

/// Errors raised while parsing or converting Sids and patterns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SidError {
    /// The input string was empty.
    #[error("empty sid")]
    Empty,

    /// The input contained an empty segment (`A//B`, leading or trailing `/`).
    #[error("empty segment in '{input}'")]
    EmptySegment { input: String },

    /// The Sid has more segments than its basetype schema allows.
    #[error("'{sid}' has {count} fields, {basetype} sids have at most {max}")]
    TooManyFields {
        sid: String,
        basetype: &'static str,
        count: usize,
        max: usize,
    },

    /// The state field contains a `.`, which would make `<state>.<ext>`
    /// file names ambiguous.
    #[error("'{sid}' has a '.' in its state field")]
    DottedState { sid: String },

    /// The search pattern is malformed.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A search Sid has no filesystem location.
    #[error("search sid '{sid}' has no path")]
    NoPath { sid: String },

    /// The path is not located under the Sid root.
    #[error("path {} is not under root {}", path.display(), root.display())]
    NotUnderRoot { path: PathBuf, root: PathBuf },
}

impl SidError {
    pub(crate) fn invalid_pattern(pattern: &str, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
}

impl From<SidError> for sidbroker_common::Error {
    fn from(err: SidError) -> Self {
        sidbroker_common::Error::InvalidSid(err.to_string())
    }
}
