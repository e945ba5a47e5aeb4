use thiserror::Error;

use crate::segmenter::RunSummary;

/// A record could not be read from the stream.
///
/// The segmenter skips the record and keeps going.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed record {position}: {reason}")]
    Malformed { position: u64, reason: String },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    pub fn malformed(position: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}

/// The output sink rejected a record. Always fatal to a run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode record: {0}")]
    Encode(String),
}

impl SinkError {
    pub fn encode(message: impl ToString) -> Self {
        Self::Encode(message.to_string())
    }
}

/// Rejected before any record is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("time window must be non-negative, got {0}")]
    NegativeTimeWindow(i64),
    #[error("edit distance threshold must be non-negative, got {0}")]
    NegativeThreshold(i64),
    #[error("columns `{first}` and `{second}` both point at index {index}")]
    ColumnConflict {
        first: &'static str,
        second: &'static str,
        index: usize,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A run stopped early. Carries the counts accumulated up to the failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("sink failed after {summary}: {source}")]
    Sink {
        summary: RunSummary,
        #[source]
        source: SinkError,
    },
}

impl RunError {
    pub fn summary(&self) -> &RunSummary {
        match self {
            Self::Sink { summary, .. } => summary,
        }
    }
}
