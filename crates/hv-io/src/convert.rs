//! # Format Conversion
//!
//! - [`json_to_csv`]: raw JSON log lines → search/click CSV rows.
//! - [`csv_to_json`]: associated CSV rows → JSON-lines [`hv_core::QueryRecord`]s.
//!
//! Both stop at the first line they cannot read.

use std::io::{BufRead, Read, Write};

use hv_core::RecordSink;

use crate::columns::AssociatedColumns;
use crate::csv_stream::{self, CsvRecords};
use crate::error::FormatError;
use crate::event::{LogKind, LogLine};
use crate::jsonl::{self, JsonLinesSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub searches: u64,
    pub clicks: u64,
}

impl ConvertSummary {
    pub fn total(&self) -> u64 {
        self.searches + self.clicks
    }
}

pub fn json_to_csv<R: BufRead, W: Write>(
    mut input: R,
    output: W,
) -> Result<ConvertSummary, FormatError> {
    let mut writer = csv_stream::writer(output);
    let mut summary = ConvertSummary::default();
    let mut buf = Vec::new();
    let mut line = 0;

    while jsonl::read_line(&mut input, &mut buf)? {
        line += 1;
        if jsonl::is_blank(&buf) {
            continue;
        }
        let log: LogLine =
            serde_json::from_slice(&buf).map_err(|source| FormatError::Json { line, source })?;
        writer.write_record(log.to_row())?;
        match log.kind() {
            LogKind::Search => summary.searches += 1,
            LogKind::Click => summary.clicks += 1,
        }
    }

    writer.flush()?;
    tracing::info!(
        searches = summary.searches,
        clicks = summary.clicks,
        "Converted log lines to CSV"
    );
    Ok(summary)
}

pub fn csv_to_json<R: Read, W: Write>(
    input: R,
    output: W,
    columns: AssociatedColumns,
) -> Result<ConvertSummary, FormatError> {
    let mut sink = JsonLinesSink::new(output);
    let mut summary = ConvertSummary::default();

    for row in CsvRecords::new(input, columns) {
        sink.write_value(&row?.to_record())?;
        summary.searches += 1;
    }

    sink.flush()?;
    tracing::info!(searches = summary.searches, "Converted CSV rows to JSON");
    Ok(summary)
}
