//! Decoder error types.

use std::path::PathBuf;

/// Errors that abort a susetags decode.
///
/// Structural variants carry the offending logical line and the physical line
/// number where it started.
#[derive(Debug, thiserror::Error)]
pub enum SusetagsError {
    /// A dependency line with neither one nor three fields.
    #[error("line {lineno}: bad dependency line: {line}")]
    BadDependency { lineno: usize, line: String },

    /// A relational operator outside `> = >= < != <=`.
    #[error("line {lineno}: unknown relation '{op}' in: {line}")]
    UnknownRelation {
        lineno: usize,
        op: String,
        line: String,
    },

    /// A location line with neither two nor three fields.
    #[error("line {lineno}: bad location line: {line}")]
    BadLocation { lineno: usize, line: String },

    /// A source line without exactly four fields.
    #[error("line {lineno}: bad source line: {line}")]
    BadSource { lineno: usize, line: String },

    /// A package or pattern line without exactly four fields.
    #[error("line {lineno}: bad package line: {line}")]
    BadPackage { lineno: usize, line: String },

    /// An opening `+Tag` line without a colon.
    #[error("line {lineno}: bad line: {line}")]
    BadTag { lineno: usize, line: String },

    /// Decode options could not be parsed.
    #[error("invalid decode options: {0}")]
    Config(#[from] toml::de::Error),

    /// Options file not found.
    #[error("options file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// I/O error reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SusetagsError {
    /// Physical line number for structural errors.
    pub fn lineno(&self) -> Option<usize> {
        match self {
            SusetagsError::BadDependency { lineno, .. }
            | SusetagsError::UnknownRelation { lineno, .. }
            | SusetagsError::BadLocation { lineno, .. }
            | SusetagsError::BadSource { lineno, .. }
            | SusetagsError::BadPackage { lineno, .. }
            | SusetagsError::BadTag { lineno, .. } => Some(*lineno),
            _ => None,
        }
    }
}

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, SusetagsError>;
