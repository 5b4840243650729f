use thiserror::Error;

/// Position of the decoder cursor at the time an argument error was raised,
/// as an index into the original argument vector.
pub type CursorPos = usize;

#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("argument {0}: expected more tokens, found end of input")]
    UnexpectedEnd(CursorPos),

    #[error("argument {0}: expected integer, found {1:?}")]
    NotAnInteger(CursorPos, String),

    #[error("argument {0}: unknown command {1:?}, expected RECORD or CLASSIFY")]
    UnknownCommand(CursorPos, String),

    #[error("bands must be >= 1, got {0}")]
    InvalidBandCount(i64),

    #[error("window must be > 0, got {0}")]
    InvalidWindow(i64),

    #[error("retention must be >= 0, got {0}")]
    InvalidRetention(i64),

    #[error("configured bands {bands} exceeds runtime limit {max}")]
    TooManyBands { bands: u16, max: u8 },

    #[error("RECORD batch of {count} requests exceeds runtime limit {max}")]
    TooManyRecordRequests { count: usize, max: usize },

    #[error("CLASSIFY batch of {count} queries exceeds runtime limit {max}")]
    TooManyClassifyQueries { count: usize, max: usize },

    #[error("trailing tokens left unconsumed at position {0}")]
    TrailingTokens(CursorPos),

    #[error("argument {0}: bucket {1} out of range for u16")]
    BucketOutOfRange(CursorPos, i64),
}

#[derive(Debug, Error)]
pub enum KeyFormatError {
    #[error("packed band/bucket field must be 3 bytes, got {0}")]
    WrongLength(usize),
}

#[derive(Debug, Error)]
#[error("storage operation {op} failed")]
pub struct StorageError {
    pub op: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl StorageError {
    pub fn new(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            op,
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    KeyFormat(#[from] KeyFormatError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("command {0:?} is not implemented")]
    NotImplemented(String),
}
