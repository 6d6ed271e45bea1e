//! Error types for the diff crate.

use docpatch_types::EncodeError;

/// Errors that abort a diff. A failed diff never yields a partial patch.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// Both inputs were absent; there is nothing to compare.
    #[error("cannot diff: both values are nil")]
    NilPair,

    /// The two sides have different concrete types at `path`.
    #[error("type mismatch at {path:?}: {old_type} vs {new_type}")]
    TypeMismatch {
        path: String,
        old_type: String,
        new_type: String,
    },

    /// The same memory is reachable from both the old and the new value.
    #[error("pointer sharing detected at {new_path:?} (old path {old_path:?}): address {address:#x}")]
    PointerSharing {
        address: usize,
        old_path: String,
        new_path: String,
    },

    /// A registered custom comparer failed.
    #[error("custom comparer failed at {path:?}: {message}")]
    Comparer { path: String, message: String },

    /// Patch encoding failed.
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
