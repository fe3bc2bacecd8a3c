//! Structured output — one JSON object per record.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use crate::sink::{Labels, LogSink};

/// Sink that writes each record as a self-contained JSON object.
///
/// Every line carries the UTC timestamp (RFC 3339, nanosecond
/// precision) and the log line; the label set is included unless
/// suppressed.
pub struct JsonSink<W> {
    writer: W,
    show_labels: bool,
}

impl<W: Write + Send> JsonSink<W> {
    /// Creates a sink writing to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            show_labels: true,
        }
    }

    /// Sets whether the label set is included.
    #[must_use]
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }
}

impl<W: Write + Send> LogSink for JsonSink<W> {
    fn emit(&mut self, timestamp: DateTime<Utc>, labels: &Labels, line: &str) -> io::Result<()> {
        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let record = if self.show_labels {
            json!({ "timestamp": timestamp, "labels": labels, "line": line })
        } else {
            json!({ "timestamp": timestamp, "line": line })
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(self.writer)
    }
}
