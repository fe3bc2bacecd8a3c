//! Label allow-list decorator.

use std::collections::BTreeSet;
use std::io;

use chrono::{DateTime, Utc};

use crate::sink::{Labels, LogSink};

/// Decorator that removes label keys not present in an allow-list
/// before delegating to the wrapped sink.
pub struct LabelFilterSink<S> {
    inner: S,
    allow: BTreeSet<String>,
}

impl<S: LogSink> LabelFilterSink<S> {
    /// Wraps a sink with the given allow-list of label keys.
    #[must_use]
    pub fn new(inner: S, allow: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner,
            allow: allow.into_iter().collect(),
        }
    }

    /// Consumes the decorator and returns the wrapped sink.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: LogSink> LogSink for LabelFilterSink<S> {
    fn emit(&mut self, timestamp: DateTime<Utc>, labels: &Labels, line: &str) -> io::Result<()> {
        let filtered: Labels = labels
            .iter()
            .filter(|(key, _)| self.allow.contains(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        self.inner.emit(timestamp, &filtered, line)
    }
}
