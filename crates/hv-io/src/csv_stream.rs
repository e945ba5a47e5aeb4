//! # CSV Record Stream
//!
//! Associated CSV rows flow through the segmenter as [`CsvRow`]s: the
//! original `StringRecord` plus the layout that says where the rule fields
//! are. The sink writes the row back exactly as it was read, every column in
//! its original order.

use std::io::{Read, Write};

use hv_core::{QueryRecord, ReadError, RecordSink, SearchQuery, SinkError, Timestamp};

use crate::columns::AssociatedColumns;

/// Reader settings shared by every CSV input: no header row, ragged rows allowed.
pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
}

/// Writer settings shared by every CSV output.
pub fn writer<W: Write>(output: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(output)
}

/// Line number of a record, for error messages.
pub(crate) fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// `true` for the spellings a click column uses for "clicked".
#[inline]
pub fn parse_click(field: &str) -> bool {
    matches!(field, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

/// One associated CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    fields: csv::StringRecord,
    columns: AssociatedColumns,
}

impl CsvRow {
    /// Wrap a raw record, rejecting rows too short for the layout.
    pub fn new(fields: csv::StringRecord, columns: AssociatedColumns) -> Result<Self, ReadError> {
        let width = columns.width();
        if fields.len() < width {
            return Err(ReadError::malformed(
                line_of(&fields),
                format!("expected at least {} fields, got {}", width, fields.len()),
            ));
        }
        Ok(Self { fields, columns })
    }

    pub fn fields(&self) -> &csv::StringRecord {
        &self.fields
    }

    /// Field at `index`; empty when a passthrough column is missing.
    fn field(&self, index: usize) -> &str {
        self.fields.get(index).unwrap_or("")
    }

    /// The structured form of this row.
    pub fn to_record(&self) -> QueryRecord {
        let c = &self.columns;
        QueryRecord {
            timestamp: Timestamp::new(self.field(c.timestamp)),
            app_id: self.field(c.app).to_string(),
            index_name: self.field(c.index).to_string(),
            query_id: self.field(c.query_id).to_string(),
            user_id: self.field(c.user).to_string(),
            context: self.field(c.context).to_string(),
            had_click: self.had_click(),
            query_text: self.field(c.query).to_string(),
            query_parameters: self.field(c.query_params).to_string(),
        }
    }
}

impl SearchQuery for CsvRow {
    fn user_id(&self) -> &str {
        self.field(self.columns.user)
    }

    fn index_name(&self) -> &str {
        self.field(self.columns.index)
    }

    fn query_text(&self) -> &str {
        self.field(self.columns.query)
    }

    fn had_click(&self) -> bool {
        parse_click(self.field(self.columns.click))
    }

    fn timestamp(&self) -> Option<i64> {
        hv_core::parse_millis(self.field(self.columns.timestamp))
    }
}

/// Associated CSV rows as a record stream.
///
/// Malformed rows come out as [`ReadError::Malformed`] and the stream goes
/// on. An I/O failure is reported once and ends the stream.
pub struct CsvRecords<R> {
    records: csv::StringRecordsIntoIter<R>,
    columns: AssociatedColumns,
    failed: bool,
}

impl<R: Read> CsvRecords<R> {
    pub fn new(input: R, columns: AssociatedColumns) -> Self {
        Self {
            records: reader(input).into_records(),
            columns,
            failed: false,
        }
    }
}

impl<R: Read> Iterator for CsvRecords<R> {
    type Item = Result<CsvRow, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.records.next()?;
        Some(match item {
            Ok(fields) => CsvRow::new(fields, self.columns),
            Err(err) => {
                if err.is_io_error() {
                    self.failed = true;
                }
                Err(read_error(err))
            }
        })
    }
}

fn read_error(err: csv::Error) -> ReadError {
    let position = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => ReadError::Io(e),
        _ => ReadError::malformed(position, reason),
    }
}

pub(crate) fn sink_error(err: csv::Error) -> SinkError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => SinkError::Io(e),
        _ => SinkError::Encode(message),
    }
}

/// Writes rows back verbatim.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(output: W) -> Self {
        Self {
            writer: writer(output),
        }
    }
}

impl<W: Write> RecordSink<CsvRow> for CsvSink<W> {
    fn write(&mut self, record: &CsvRow) -> Result<(), SinkError> {
        self.writer.write_record(record.fields()).map_err(sink_error)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(SinkError::Io)
    }
}
