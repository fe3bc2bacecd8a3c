//! The sink trait and format-by-name construction.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::filter::LabelFilterSink;
use crate::human::HumanSink;
use crate::json::JsonSink;

/// Label set attached to a log record.
///
/// A `BTreeMap` so that rendered label sets have a stable key order.
pub type Labels = BTreeMap<String, String>;

/// Destination for formatted log records.
///
/// Both the range-query path and the live-tail path deliver every record
/// through this trait. Implementations are format-specific; records are
/// written in the order `emit` is called.
pub trait LogSink: Send {
    /// Writes a single log record to the underlying destination.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the destination fails.
    fn emit(&mut self, timestamp: DateTime<Utc>, labels: &Labels, line: &str) -> io::Result<()>;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn emit(&mut self, timestamp: DateTime<Utc>, labels: &Labels, line: &str) -> io::Result<()> {
        (**self).emit(timestamp, labels, line)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable single-line text.
    #[default]
    Default,
    /// One JSON object per line, for machine consumption.
    Json,
}

/// Error returned when a format name is not recognized.
#[derive(Debug, Error)]
#[error("unknown output format: {0}")]
pub struct UnknownFormatError(pub String);

impl FromStr for Format {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "json" => Ok(Self::Json),
            other => Err(UnknownFormatError(other.to_string())),
        }
    }
}

/// Configuration for building a sink by name.
#[derive(Debug, Clone, Default)]
pub struct SinkConfig {
    /// Which output format to use.
    pub format: Format,
    /// Suppress the label set entirely.
    pub no_labels: bool,
    /// Only show labels whose key appears in this list.
    pub allow_labels: Option<Vec<String>>,
    /// Colorize human-readable output.
    pub color: bool,
}

impl SinkConfig {
    /// Builds a boxed sink writing to the given destination.
    #[must_use]
    pub fn build(self, writer: Box<dyn Write + Send>) -> Box<dyn LogSink + Send> {
        let inner: Box<dyn LogSink + Send> = match self.format {
            Format::Default => Box::new(
                HumanSink::new(writer)
                    .with_labels(!self.no_labels)
                    .with_color(self.color),
            ),
            Format::Json => Box::new(JsonSink::new(writer).with_labels(!self.no_labels)),
        };

        match self.allow_labels {
            Some(allow) => Box::new(LabelFilterSink::new(inner, allow)),
            None => inner,
        }
    }
}
