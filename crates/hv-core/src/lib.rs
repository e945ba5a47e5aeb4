//! # hv-core — The "Rules" of HARVEST
//!
//! Decides where one search session ends and the next begins.
//!
//! A search log is an ordered stream of queries, each annotated with whether
//! it led to a click. Consecutive queries from the same user on the same index
//! form a session; only the last (terminal) query of each session is kept.
//! The [`Segmenter`] walks the stream once with a single record of lookahead
//! and forwards terminal records to a [`RecordSink`].
//!
//! This crate does no I/O. File formats live in `hv-io`.

pub mod distance;
pub mod error;
pub mod policy;
pub mod record;
pub mod rules;
pub mod segmenter;

pub use distance::levenshtein;
pub use error::{ConfigError, ReadError, RunError, SinkError};
pub use policy::{SegmenterConfig, SessionPolicy};
pub use record::{parse_millis, QueryRecord, SearchQuery, Timestamp};
pub use rules::{decide, Decision, Rule, Verdict};
pub use segmenter::{RecordSink, RunSummary, Segmenter};
