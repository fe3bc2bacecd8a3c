//! # logtap-output
//!
//! Output sinks for log records.
//!
//! This crate provides:
//!
//! - [`LogSink`] — The sink trait every record is delivered through
//! - [`HumanSink`] — Single-line, optionally colorized text output
//! - [`JsonSink`] — One self-contained JSON object per record
//! - [`LabelFilterSink`] — Allow-list decorator over any sink
//! - [`SinkConfig`] — Construction of a boxed sink by format name
//!
//! ## Example
//!
//! ```rust
//! use logtap_output::{Format, SinkConfig};
//!
//! let config = SinkConfig {
//!     format: Format::Json,
//!     no_labels: false,
//!     allow_labels: None,
//!     color: false,
//! };
//! let mut sink = config.build(Box::new(std::io::stdout()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod filter;
pub mod human;
pub mod json;
pub mod sink;

// Re-export main types
pub use filter::LabelFilterSink;
pub use human::HumanSink;
pub use json::JsonSink;
pub use sink::{Format, Labels, LogSink, SinkConfig, UnknownFormatError};
