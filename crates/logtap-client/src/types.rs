//! Wire and data-model types shared by both transports.
//!
//! This module provides:
//! - [`LogRecord`] — A single delivered log record
//! - [`Entry`] — One (timestamp, line) pair inside a stream
//! - [`LabeledStream`] — One backend partition sharing a label set
//! - [`RangeResponse`] — The range-query endpoint's response
//! - [`TailFrame`] — One frame from the tail subscription

use chrono::{DateTime, Utc};
use logtap_output::Labels;
use serde::{Deserialize, Serialize};

/// Result-type tag the client knows how to flatten.
pub const RESULT_TYPE_STREAMS: &str = "streams";

/// A single log record, immutable once received.
///
/// Ordering between two records is by `timestamp` ascending; ties keep
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the line was produced.
    pub timestamp: DateTime<Utc>,
    /// Label set of the stream the line belongs to.
    #[serde(default)]
    pub labels: Labels,
    /// The log line itself.
    pub line: String,
}

/// One (timestamp, line) pair inside a [`LabeledStream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// When the line was produced.
    pub timestamp: DateTime<Utc>,
    /// The log line itself.
    pub line: String,
}

/// One backend partition of log entries sharing a label set.
///
/// A range query returns zero or more of these; global ordering across
/// streams is not guaranteed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledStream {
    /// Labels shared by every entry in this stream.
    #[serde(default)]
    pub labels: Labels,
    /// Entries in the stream's own order.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Response from the range-query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeResponse {
    /// Tag describing the shape of the result.
    #[serde(rename = "resultType")]
    pub result_type: String,
    /// The matching streams, when `result_type` is `"streams"`.
    #[serde(default)]
    pub streams: Vec<LabeledStream>,
}

impl RangeResponse {
    /// Total number of entries across all streams.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.streams.iter().map(|s| s.entries.len()).sum()
    }
}

/// One frame of newly produced records from the tail subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailFrame {
    /// Streams carried by this frame, in backend order.
    #[serde(default)]
    pub streams: Vec<LabeledStream>,
}
