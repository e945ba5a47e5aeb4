//! # hv-io — The "Plumbing" of HARVEST
//!
//! Everything between files on disk and the `hv-core` segmenter:
//!
//! - [`columns`] — where each field lives in a CSV row.
//! - [`csv_stream`] — CSV rows as a record stream, and a CSV sink that writes
//!   rows back untouched.
//! - [`jsonl`] — JSON-lines records as a stream and a sink.
//! - [`event`] — the raw `{"jsonPayload": {...}}` log line model.
//! - [`convert`] — JSON log lines to CSV, associated CSV to JSON lines.
//! - [`annotate`] — the click set and the search/click join.

pub mod annotate;
pub mod columns;
pub mod convert;
pub mod csv_stream;
pub mod error;
pub mod event;
pub mod jsonl;

pub use error::FormatError;
