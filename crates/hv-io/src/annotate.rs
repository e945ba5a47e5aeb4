//! # Click Association
//!
//! Joins clicks onto searches: every query id that appears in the click log
//! marks its search as clicked. The output is an associated CSV, ready for
//! the segmenter.

use std::collections::HashSet;
use std::io::{Read, Write};

use crate::columns::{ClickColumns, SearchColumns};
use crate::csv_stream::{self, line_of};
use crate::error::FormatError;

/// Distinct query ids that received at least one click.
#[derive(Debug, Clone, Default)]
pub struct ClickSet {
    query_ids: HashSet<String>,
}

impl ClickSet {
    pub fn from_csv<R: Read>(input: R, columns: ClickColumns) -> Result<Self, FormatError> {
        let mut set = Self::default();
        for record in csv_stream::reader(input).into_records() {
            let record = record?;
            let query_id = record.get(columns.query_id).ok_or_else(|| FormatError::Malformed {
                position: line_of(&record),
                reason: format!("click row has no column {}", columns.query_id),
            })?;
            set.insert(query_id);
        }
        tracing::info!("Got {} unique queries with clicks", set.len());
        Ok(set)
    }

    pub fn insert(&mut self, query_id: &str) {
        if !self.query_ids.contains(query_id) {
            self.query_ids.insert(query_id.to_string());
        }
    }

    pub fn contains(&self, query_id: &str) -> bool {
        self.query_ids.contains(query_id)
    }

    pub fn len(&self) -> usize {
        self.query_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.query_ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateSummary {
    pub searches: u64,
    pub clicked: u64,
}

/// Write one associated row per search row, flagging the clicked ones.
pub fn annotate<R: Read, W: Write>(
    searches: R,
    clicks: &ClickSet,
    columns: SearchColumns,
    output: W,
) -> Result<AnnotateSummary, FormatError> {
    let mut writer = csv_stream::writer(output);
    let mut summary = AnnotateSummary::default();
    let width = columns.width();

    for record in csv_stream::reader(searches).into_records() {
        let record = record?;
        if record.len() < width {
            return Err(FormatError::Malformed {
                position: line_of(&record),
                reason: format!("expected at least {} fields, got {}", width, record.len()),
            });
        }
        // Width was checked above, so every column is present.
        let field = |index: usize| record.get(index).unwrap_or_default();
        let had_click = clicks.contains(field(columns.query_id));

        writer.write_record([
            field(columns.timestamp),
            field(columns.app),
            field(columns.index),
            field(columns.query_id),
            field(columns.user),
            field(columns.context),
            if had_click { "true" } else { "false" },
            // Free-text fields go last so `cut -d,` still works on the rest.
            field(columns.query),
            field(columns.query_params),
        ])?;

        summary.searches += 1;
        if had_click {
            summary.clicked += 1;
        }
    }

    writer.flush()?;
    tracing::info!("Processed {} searches", summary.searches);
    Ok(summary)
}
