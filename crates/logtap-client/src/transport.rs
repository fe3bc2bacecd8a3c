//! Seams between the engine and the network.
//!
//! The range executor and the tail session are written against these
//! traits so the core logic never depends on a specific HTTP or
//! WebSocket library's error types. Production implementations live in
//! [`http`](crate::http) and [`ws`](crate::ws); tests use scripted
//! in-process doubles.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::TransportError;
use crate::query::Query;
use crate::types::{RangeResponse, TailFrame};

/// Supplies the bearer credential and tenant scope used to authorize
/// every range-query and tail-subscription call.
pub trait CredentialProvider: Send + Sync {
    /// The current bearer token.
    fn current_token(&self) -> String;
    /// The tenant/organization scope the caller is authorized for.
    fn current_tenant(&self) -> String;
}

/// One bounded range-query call against the backend.
pub trait RangeTransport: Send + Sync {
    /// Executes exactly one range query.
    fn query_range(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<RangeResponse, TransportError>> + Send;
}

/// Parameters for opening one tail subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailRequest {
    /// Backend filter expression.
    pub expression: String,
    /// Effective start time — the session's cursor value.
    pub start: DateTime<Utc>,
    /// Maximum entries per delivery; zero means backend default.
    pub limit: u32,
    /// How far behind real time the backend may delay delivery.
    pub delay_for: Duration,
}

/// Opens persistent tail subscriptions.
pub trait TailConnector: Send + Sync {
    /// The connection type produced by [`connect`](Self::connect).
    type Conn: TailConnection;

    /// Opens a subscription for the given request.
    fn connect(
        &self,
        request: &TailRequest,
    ) -> impl Future<Output = Result<Self::Conn, TransportError>> + Send;
}

/// One established tail subscription.
pub trait TailConnection: Send {
    /// Blocks until the next frame arrives.
    ///
    /// # Errors
    ///
    /// Returns [`TailReadError::NormalClosure`] when the backend ends
    /// the subscription cleanly, [`TailReadError::AbnormalClosure`] for
    /// teardown eligible for reconnection, and
    /// [`TailReadError::Protocol`] for anything else.
    fn next_frame(&mut self) -> impl Future<Output = Result<TailFrame, TailReadError>> + Send;

    /// Best-effort closure; errors are swallowed.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Classified failure of a tail read.
///
/// The two-valued classification (normal vs abnormal) is the only thing
/// the session's state machine inspects; everything else is terminal.
#[derive(Debug, Clone, Error)]
pub enum TailReadError {
    /// The backend closed the subscription cleanly. Not a failure.
    #[error("connection closed normally")]
    NormalClosure,

    /// Unexpected teardown, eligible for reconnection.
    #[error("abnormal closure: {0}")]
    AbnormalClosure(String),

    /// A read failure that is neither closure kind. Terminal.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TailReadError {
    /// Whether this is a clean closure.
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::NormalClosure)
    }

    /// Whether this closure is eligible for reconnection.
    #[must_use]
    pub const fn is_abnormal(&self) -> bool {
        matches!(self, Self::AbnormalClosure(_))
    }
}
