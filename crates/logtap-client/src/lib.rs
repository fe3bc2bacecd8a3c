//! # logtap-client
//!
//! Client engine for a remote log backend exposing a bounded range-query
//! endpoint and a persistent tail subscription.
//!
//! This crate provides:
//!
//! - [`Query`] and [`selector`] — Immutable query values and the tenant-scoped
//!   filter expression builder
//! - [`query_range`] / [`query_range_with_retry`] — One-shot historical
//!   retrieval, merged into chronological order
//! - [`tail`] — A long-lived tail session with automatic reconnection
//! - [`RangeTransport`], [`TailConnector`], [`TailConnection`] — Seams the
//!   engine is written against
//! - [`HttpRangeClient`], [`WsTailConnector`] — Production transports
//! - [`ClientError`] — The error taxonomy shared by both paths
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use logtap_client::{selector, HttpRangeClient, Query};
//! use logtap_output::SinkConfig;
//!
//! # struct Env;
//! # impl logtap_client::CredentialProvider for Env {
//! #     fn current_token(&self) -> String { String::new() }
//! #     fn current_tenant(&self) -> String { String::new() }
//! # }
//! # async fn example() -> logtap_client::Result<()> {
//! let credentials = Arc::new(Env);
//! let transport = HttpRangeClient::new("https://logs.example.com", credentials)?;
//!
//! let end = Utc::now();
//! let query = Query::new(
//!     selector("app", "billing", "acme"),
//!     end - Duration::minutes(5),
//!     end,
//! );
//!
//! let mut sink = SinkConfig::default().build(Box::new(std::io::stdout()));
//! logtap_client::query_range(&transport, &mut sink, &query).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backoff;
pub mod error;
pub mod http;
pub mod query;
pub mod range;
pub mod tail;
pub mod transport;
pub mod types;
pub mod ws;

// Re-export main types
pub use backoff::BackoffPolicy;
pub use error::{ClientError, Result, TransportError};
pub use http::HttpRangeClient;
pub use query::{selector, Direction, Query, TENANT_LABEL};
pub use range::{query_range, query_range_with_retry};
pub use tail::{tail, tail_with_options, TailOptions};
pub use transport::{
    CredentialProvider, RangeTransport, TailConnection, TailConnector, TailReadError, TailRequest,
};
pub use types::{Entry, LabeledStream, LogRecord, RangeResponse, TailFrame};
pub use ws::WsTailConnector;
