//! Human-readable single-line output.

use std::io::{self, Write};

use chrono::{DateTime, Local, SecondsFormat, Utc};

use crate::sink::{Labels, LogSink};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Sink that renders each record as a single line of text.
///
/// Timestamps are shown in the local time zone. The label set is shown
/// between the timestamp and the line unless suppressed.
pub struct HumanSink<W> {
    writer: W,
    show_labels: bool,
    color: bool,
}

impl<W: Write + Send> HumanSink<W> {
    /// Creates a sink writing to the given destination.
    ///
    /// Labels are shown and color is off by default.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            show_labels: true,
            color: false,
        }
    }

    /// Sets whether the label set is rendered.
    #[must_use]
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    /// Enables or disables ANSI color.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl<W: Write + Send> LogSink for HumanSink<W> {
    fn emit(&mut self, timestamp: DateTime<Utc>, labels: &Labels, line: &str) -> io::Result<()> {
        let local = timestamp
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        if self.color {
            write!(self.writer, "{DIM}{local}{RESET} ")?;
        } else {
            write!(self.writer, "{local} ")?;
        }

        if self.show_labels {
            let rendered = render_labels(labels);
            if self.color {
                write!(self.writer, "{CYAN}{rendered}{RESET} ")?;
            } else {
                write!(self.writer, "{rendered} ")?;
            }
        }

        writeln!(self.writer, "{line}")
    }
}

/// Renders a label set as `{key="value", ...}` in key order.
fn render_labels(labels: &Labels) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in labels.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap()
    }

    #[test]
    fn emits_line_with_labels() {
        let mut buf = Vec::new();
        HumanSink::new(&mut buf)
            .emit(ts(), &labels(&[("app", "x"), ("pod", "y")]), "started")
            .expect("emit");

        let out = String::from_utf8(buf).expect("valid utf8");
        assert!(out.contains("{app=\"x\", pod=\"y\"}"));
        assert!(out.ends_with("started\n"));
    }

    #[test]
    fn labels_render_in_key_order() {
        let mut buf = Vec::new();
        HumanSink::new(&mut buf)
            .emit(ts(), &labels(&[("pod", "y"), ("app", "x")]), "line")
            .expect("emit");

        let out = String::from_utf8(buf).expect("valid utf8");
        let app = out.find("app=").expect("app label");
        let pod = out.find("pod=").expect("pod label");
        assert!(app < pod);
    }

    #[test]
    fn no_labels_suppresses_label_set() {
        let mut buf = Vec::new();
        HumanSink::new(&mut buf)
            .with_labels(false)
            .emit(ts(), &labels(&[("app", "x")]), "started")
            .expect("emit");

        let out = String::from_utf8(buf).expect("valid utf8");
        assert!(!out.contains("app"));
        assert!(out.ends_with("started\n"));
    }

    #[test]
    fn color_wraps_timestamp_and_labels() {
        let mut buf = Vec::new();
        HumanSink::new(&mut buf)
            .with_color(true)
            .emit(ts(), &labels(&[("app", "x")]), "started")
            .expect("emit");

        let out = String::from_utf8(buf).expect("valid utf8");
        assert!(out.contains(DIM));
        assert!(out.contains(CYAN));
        assert!(out.contains(RESET));
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let mut buf = Vec::new();
        HumanSink::new(&mut buf)
            .emit(ts(), &labels(&[("app", "x")]), "started")
            .expect("emit");

        let out = String::from_utf8(buf).expect("valid utf8");
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn empty_label_set_renders_braces() {
        assert_eq!(render_labels(&Labels::new()), "{}");
    }
}
