//! Writing records and summaries to stdout.
//!
//! Plain output is one `column: value` line per record; JSON output is one
//! object per line (JSON Lines), ready for `jq`.

use std::io::{self, ErrorKind, Write};

use rust_decimal::Decimal;
use serde_json::json;

use crate::config::OutputFormat;
use crate::storage::{ImportReport, Record};

/// Writer wrapper that treats a closed pipe as the end of output.
///
/// Once the reader goes away (`user_stream | head`), further writes are
/// dropped and [`IgnoreBrokenPipe::is_closed`] turns `true`.
pub(crate) struct IgnoreBrokenPipe<W: Write> {
    inner: W,
    closed: bool,
}

impl<W: Write> IgnoreBrokenPipe<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<W: Write> Write for IgnoreBrokenPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Ok(buf.len());
        }
        self.inner.write(buf).or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                // Downstream command closed the pipe
                self.closed = true;
                Ok(buf.len())
            } else {
                Err(e)
            }
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.inner.flush().or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                self.closed = true;
                Ok(())
            } else {
                Err(e)
            }
        })
    }
}

/// Formats command output in the selected [`OutputFormat`].
pub(crate) struct RecordWriter<W: Write> {
    out: IgnoreBrokenPipe<W>,
    format: OutputFormat,
}

impl<W: Write> RecordWriter<W> {
    pub(crate) fn new(inner: W, format: OutputFormat) -> Self {
        Self {
            out: IgnoreBrokenPipe::new(inner),
            format,
        }
    }

    /// `true` once stdout's reader has gone away.
    pub(crate) fn is_closed(&self) -> bool {
        self.out.is_closed()
    }

    pub(crate) fn write_record(&mut self, record: &Record) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(self.out, "{record}"),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)
            }
        }
    }

    /// Header line printed before each page in plain output.
    pub(crate) fn write_page_header(&mut self, number: usize, offset: u64) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(self.out, "-- page {number} (offset {offset}) --"),
            OutputFormat::Json => Ok(()),
        }
    }

    pub(crate) fn write_average(&mut self, average: Option<Decimal>) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => match average {
                Some(age) => writeln!(self.out, "Average age of users: {:.2}", age),
                None => writeln!(self.out, "Average age of users: n/a"),
            },
            OutputFormat::Json => {
                let value = average.map(|age| format!("{age:.2}"));
                writeln!(self.out, "{}", json!({ "average_age": value }))
            }
        }
    }

    pub(crate) fn write_import_report(&mut self, report: &ImportReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(self.out, "Imported CSV: {report}"),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, report)?;
                writeln!(self.out)
            }
        }
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
