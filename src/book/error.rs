//! Error types for book ingestion.

/// Errors raised while ingesting a Polyglot byte stream.
///
/// Lookup never fails; only reading a book can.
#[derive(thiserror::Error, Debug)]
pub enum BookError {
    /// The stream ended inside a record
    #[error("malformed record at byte {offset}: {trailing} trailing bytes, expected a multiple of 16")]
    MalformedRecord { offset: u64, trailing: usize },

    /// Underlying reader failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record bytes could not be decoded
    #[error("record decode failed: {0}")]
    Decode(#[from] binread::Error),
}

/// Result type for book operations
pub type BookResult<T> = Result<T, BookError>;
