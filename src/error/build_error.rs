//! Schema construction errors.

/// The schema graph is inconsistent.
///
/// These describe programmer or configuration mistakes, independent of any
/// input, and are returned from fallible builders and from descriptor
/// compilation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaBuildError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("bounds must be finite, got {min}..={max}")]
    NonFiniteBound { min: f64, max: f64 },

    #[error("lower bound {min} exceeds upper bound {max}")]
    InvertedBounds { min: f64, max: f64 },

    /// A check was attached to a kind it cannot apply to, e.g. a numeric
    /// bound on a string.
    #[error("check '{check}' does not apply to {kind} schemas")]
    UnsupportedCheck { check: String, kind: &'static str },

    #[error("array schema at '{at}' has no element schema")]
    MissingElement { at: String },

    #[error("required field '{0}' is not declared")]
    UndeclaredRequired(String),

    #[error("unknown schema kind '{0}'")]
    UnknownKind(String),

    #[error("unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("malformed descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
}
