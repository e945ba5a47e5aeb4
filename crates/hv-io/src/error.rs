use thiserror::Error;

use hv_core::{ReadError, SinkError};

/// Failure of a conversion or annotation pass. These passes have no
/// skip-and-continue mode: the first bad line stops them.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("line {line}: invalid log line: {source}")]
    Json {
        line: u64,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed record {position}: {reason}")]
    Malformed { position: u64, reason: String },
    #[error("could not encode record: {0}")]
    Encode(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ReadError> for FormatError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Malformed { position, reason } => Self::Malformed { position, reason },
            ReadError::Io(e) => Self::Io(e),
        }
    }
}

impl From<SinkError> for FormatError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Io(e) => Self::Io(e),
            SinkError::Encode(message) => Self::Encode(message),
        }
    }
}
