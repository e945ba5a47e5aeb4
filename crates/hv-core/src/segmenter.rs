//! # Segmenter — Single-Pass Session Cutter
//!
//! Walks a record stream once, holding at most two records (`current` and
//! its lookahead `next`), and forwards every terminal record to a sink in
//! stream order.
//!
//! - Read errors are skipped and counted; the run continues.
//! - Sink errors are fatal; the run stops and reports what it had done.

use std::fmt;

use crate::error::{ReadError, RunError, SinkError};
use crate::policy::SessionPolicy;
use crate::record::SearchQuery;
use crate::rules::decide;

/// Destination for terminal records.
pub trait RecordSink<R> {
    fn write(&mut self, record: &R) -> Result<(), SinkError>;

    /// Called once after the last record of a successful run.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<R: Clone> RecordSink<R> for Vec<R> {
    fn write(&mut self, record: &R) -> Result<(), SinkError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read successfully.
    pub processed: u64,
    /// Records judged terminal and written.
    pub terminal: u64,
    /// Records the stream failed to produce.
    pub skipped: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} searches, got {} terminal searches, skipped {}",
            self.processed, self.terminal, self.skipped
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter {
    policy: SessionPolicy,
}

impl Segmenter {
    pub fn new(policy: SessionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Consume `stream` to exhaustion, writing terminal records to `sink`.
    pub fn run<R, I, K>(&self, stream: I, sink: &mut K) -> Result<RunSummary, RunError>
    where
        R: SearchQuery,
        I: IntoIterator<Item = Result<R, ReadError>>,
        K: RecordSink<R> + ?Sized,
    {
        let mut stream = stream.into_iter();
        let mut summary = RunSummary::default();

        let Some(mut current) = next_record(&mut stream, &mut summary) else {
            tracing::info!("No search queries to process");
            return Ok(summary);
        };

        loop {
            let next = next_record(&mut stream, &mut summary);
            let decision = decide(&self.policy, &current, next.as_ref());

            tracing::debug!(
                query = current.query_text(),
                rule = %decision.rule,
                terminal = decision.verdict.is_terminal(),
                "query {}",
                decision.rule.describe()
            );

            if decision.verdict.is_terminal() {
                if let Err(source) = sink.write(&current) {
                    return Err(RunError::Sink { summary, source });
                }
                summary.terminal += 1;
            }

            match next {
                Some(next) => current = next,
                None => break,
            }
        }

        if let Err(source) = sink.flush() {
            return Err(RunError::Sink { summary, source });
        }

        tracing::info!("{}", summary);
        Ok(summary)
    }
}

/// Pull the next readable record, skipping (and counting) failures.
fn next_record<R, I>(stream: &mut I, summary: &mut RunSummary) -> Option<R>
where
    I: Iterator<Item = Result<R, ReadError>>,
{
    for item in stream.by_ref() {
        match item {
            Ok(record) => {
                summary.processed += 1;
                return Some(record);
            }
            Err(e) => {
                summary.skipped += 1;
                tracing::warn!("Error while reading search stream: {}", e);
            }
        }
    }
    None
}
