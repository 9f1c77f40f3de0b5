//! Error types for error-code extraction

use std::path::PathBuf;
use thiserror::Error;

use crate::frontend::ParseError;
use crate::util::span::Position;

/// A message argument the evaluator refused to fold
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Only raised under [`UnfoldablePolicy::Reject`](super::eval::UnfoldablePolicy)
    #[error("Cannot fold {kind} into a message")]
    Unfoldable {
        kind: &'static str,
        span: swc_core::common::Span,
    },
}

impl EvalError {
    pub fn span(&self) -> swc_core::common::Span {
        match self {
            EvalError::Unfoldable { span, .. } => *span,
        }
    }
}

/// Errors from the persisted code map
#[derive(Debug, Error)]
pub enum StoreError {
    /// Two ids carry the same message; the map is no longer a bijection
    #[error("Codes {first} and {second} share the message {message:?}")]
    DuplicateMessage {
        first: u32,
        second: u32,
        message: String,
    },

    /// Every `u32` id is taken
    #[error("Error code space exhausted")]
    IdOverflow,

    /// Serializing the map failed
    #[error("Failed to serialize code map: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the map file failed
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort the scan of one file. The code map is left untouched.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{source} at {position}")]
    Eval {
        source: EvalError,
        position: Position,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Session-level errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A required option is missing; reported before any I/O
    #[error("Missing option `{0}`: pass the path of the error code map and the output directory")]
    Config(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Writing a generated module or creating its directory failed
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for extraction sessions
pub type ExtractResult<T> = Result<T, ExtractError>;
