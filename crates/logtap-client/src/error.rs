//! Error types for the query and tail engine.

use thiserror::Error;

/// A network- or connection-level failure reported by a transport.
///
/// Transport errors are transient by classification: the retrying range
/// query and the tail reconnect loop both retry them up to their fixed
/// budgets. Plain [`query_range`](crate::query_range) surfaces them as-is.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    /// Creates a transport error with the given description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by the query and tail operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A range query's single transport call failed.
    #[error("query failed: {0}")]
    Query(#[from] TransportError),

    /// The backend returned a result shape this client cannot interpret.
    /// A protocol mismatch, never retried.
    #[error("unsupported result type: {0}")]
    UnsupportedResult(String),

    /// The retrying range query exhausted its attempt budget on
    /// transport failures.
    #[error("query failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The last transport failure.
        #[source]
        source: TransportError,
    },

    /// The tail session could not re-establish a connection within its
    /// retry budget.
    #[error("reconnect failed after {attempts} attempts: {last_error}")]
    ReconnectExhausted {
        /// How many connection attempts were made.
        attempts: u32,
        /// Description of the last connection failure.
        last_error: String,
    },

    /// A tail read failed in a way that is neither a normal nor an
    /// abnormal closure. Treated as a protocol violation, never retried.
    #[error("stream read error: {0}")]
    StreamRead(String),

    /// Writing a record to the output sink failed.
    #[error("sink error: {0}")]
    Sink(#[from] std::io::Error),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
