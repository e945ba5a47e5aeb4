//! # JSON Lines
//!
//! One JSON object per line. Blank lines are ignored.
//!
//! Records flow through the segmenter as [`JsonRow`]s: the raw bytes of the
//! line plus the fields the rules read. The sink writes the raw bytes back,
//! so a forwarded record keeps its field order, value types and any fields
//! the rules never look at.

use std::io::{self, BufRead, Write};

use serde::Serialize;

use hv_core::{QueryRecord, ReadError, RecordSink, SearchQuery, SinkError};

/// Read one line into `buf` without its `\n` (or `\r\n`) terminator.
///
/// Returns `Ok(false)` at end of input. The bytes are not decoded, so a line
/// that is not UTF-8 is still a line.
pub(crate) fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

pub(crate) fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// One JSON-lines record, kept as it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRow {
    raw: Vec<u8>,
    record: QueryRecord,
}

impl JsonRow {
    /// Decode `raw`; `line` only labels the error.
    pub fn parse(raw: Vec<u8>, line: u64) -> Result<Self, ReadError> {
        let record =
            serde_json::from_slice(&raw).map_err(|e| ReadError::malformed(line, e.to_string()))?;
        Ok(Self { raw, record })
    }

    /// The line exactly as read, without its terminator.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn record(&self) -> &QueryRecord {
        &self.record
    }

    pub fn into_record(self) -> QueryRecord {
        self.record
    }
}

impl SearchQuery for JsonRow {
    fn user_id(&self) -> &str {
        self.record.user_id()
    }

    fn index_name(&self) -> &str {
        self.record.index_name()
    }

    fn query_text(&self) -> &str {
        self.record.query_text()
    }

    fn had_click(&self) -> bool {
        self.record.had_click()
    }

    fn timestamp(&self) -> Option<i64> {
        SearchQuery::timestamp(&self.record)
    }
}

/// [`JsonRow`]s read from JSON lines.
///
/// Undecodable lines, invalid UTF-8 included, come out as
/// [`ReadError::Malformed`] and the stream goes on. An I/O failure is
/// reported once and ends the stream.
pub struct JsonLines<R> {
    input: R,
    buf: Vec<u8>,
    line: u64,
    failed: bool,
}

impl<R: BufRead> JsonLines<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buf: Vec::new(),
            line: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = Result<JsonRow, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match read_line(&mut self.input, &mut self.buf) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(ReadError::Io(e)));
                }
            }
            self.line += 1;
            if is_blank(&self.buf) {
                continue;
            }
            return Some(JsonRow::parse(self.buf.clone(), self.line));
        }
    }
}

/// Writes one JSON value per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serialize `value` as a new line.
    pub fn write_value<T: Serialize>(&mut self, value: &T) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, value).map_err(|e| {
            if e.is_io() {
                SinkError::Io(e.into())
            } else {
                SinkError::encode(e)
            }
        })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> RecordSink<JsonRow> for JsonLinesSink<W> {
    fn write(&mut self, record: &JsonRow) -> Result<(), SinkError> {
        self.writer.write_all(record.raw())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
