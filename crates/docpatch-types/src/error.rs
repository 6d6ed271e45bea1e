use thiserror::Error;

/// Errors produced while encoding patch values to binary form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("document key contains a NUL byte: {0:?}")]
    InvalidKey(String),

    #[error("encoded document exceeds the maximum size: {0} bytes")]
    DocumentTooLarge(usize),
}
