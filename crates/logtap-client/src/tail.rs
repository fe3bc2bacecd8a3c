//! Live tail sessions with automatic reconnection.
//!
//! A session moves through Connecting → Streaming → (Reconnecting |
//! Closing) → Closed. The cursor — the timestamp of the last record
//! delivered to the sink — is the resumption point for every reconnect,
//! so a record at exactly the cursor may be redelivered across a
//! reconnect boundary, but nothing is silently dropped or re-requested
//! from strictly before it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use logtap_output::LogSink;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::error::{ClientError, Result};
use crate::query::Query;
use crate::transport::{TailConnection, TailConnector, TailRequest};
use crate::types::TailFrame;

/// Options governing a tail session.
#[derive(Debug, Clone)]
pub struct TailOptions {
    /// How far behind real time the backend may delay delivery.
    pub delay_for: Duration,
    /// Reconnect backoff policy. The default carries the session
    /// contract's fixed budget; tests substitute faster timings.
    pub reconnect: BackoffPolicy,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            delay_for: Duration::ZERO,
            reconnect: BackoffPolicy::tail_reconnect(),
        }
    }
}

/// Tails the query until cancellation, a backend normal closure, or an
/// unrecoverable error.
///
/// Frames are delivered to the sink in arrival order — no re-sorting is
/// performed within a frame. On abnormal disconnection the session
/// transparently reconnects from the last delivered timestamp, up to
/// the reconnect budget.
///
/// # Errors
///
/// Returns [`ClientError::ReconnectExhausted`] when the connection
/// cannot be re-established within the budget,
/// [`ClientError::StreamRead`] on a read failure that is neither
/// closure kind, or [`ClientError::Sink`] when delivery fails.
/// Cancellation and backend normal closure are clean terminations.
pub async fn tail<C, S>(
    connector: &C,
    cancel: CancellationToken,
    delay_for: Duration,
    sink: &mut S,
    query: &Query,
) -> Result<()>
where
    C: TailConnector,
    S: LogSink + ?Sized,
{
    let options = TailOptions {
        delay_for,
        ..Default::default()
    };
    tail_with_options(connector, cancel, options, sink, query).await
}

/// [`tail`] with explicit options.
pub async fn tail_with_options<C, S>(
    connector: &C,
    cancel: CancellationToken,
    options: TailOptions,
    sink: &mut S,
    query: &Query,
) -> Result<()>
where
    C: TailConnector,
    S: LogSink + ?Sized,
{
    let session = TailSession {
        connector,
        sink,
        cancel,
        options,
        query,
        cursor: query.start,
        attempts: 0,
        last_error: String::new(),
    };
    session.run().await
}

/// What ended one connection epoch.
enum StreamOutcome {
    /// Clean termination: cancellation or backend normal closure.
    Closed,
    /// Abnormal closure; reconnect from the cursor.
    Reconnect,
}

struct TailSession<'a, C, S: ?Sized> {
    connector: &'a C,
    sink: &'a mut S,
    cancel: CancellationToken,
    options: TailOptions,
    query: &'a Query,
    /// Timestamp of the last delivered record. Only ever moves forward.
    cursor: DateTime<Utc>,
    /// Consecutive failed connection attempts.
    attempts: u32,
    last_error: String,
}

impl<C, S> TailSession<'_, C, S>
where
    C: TailConnector,
    S: LogSink + ?Sized,
{
    async fn run(mut self) -> Result<()> {
        loop {
            // Connecting (and Reconnecting's connect phase).
            let Some(conn) = self.connect().await? else {
                return Ok(()); // cancelled
            };

            // Streaming.
            match self.stream(conn).await? {
                StreamOutcome::Closed => return Ok(()),
                StreamOutcome::Reconnect => {}
            }
        }
    }

    /// Opens a subscription from the current cursor, consuming the retry
    /// budget on failures. Returns `None` when cancelled.
    async fn connect(&mut self) -> Result<Option<C::Conn>> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(None);
            }

            let request = TailRequest {
                expression: self.query.expression.clone(),
                start: self.cursor,
                limit: self.query.limit,
                delay_for: self.options.delay_for,
            };

            debug!(start = %self.cursor, "opening tail subscription");
            let result = tokio::select! {
                () = self.cancel.cancelled() => return Ok(None),
                result = self.connector.connect(&request) => result,
            };

            match result {
                Ok(conn) => {
                    // Budget resets on every successful establishment.
                    self.attempts = 0;
                    return Ok(Some(conn));
                }
                Err(e) => {
                    self.attempts += 1;
                    self.last_error = e.to_string();

                    if !self.options.reconnect.should_retry(self.attempts) {
                        return Err(ClientError::ReconnectExhausted {
                            attempts: self.attempts,
                            last_error: std::mem::take(&mut self.last_error),
                        });
                    }

                    let delay = self.options.reconnect.delay_for_attempt(self.attempts);
                    warn!(
                        attempt = self.attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "tail connect failed, backing off"
                    );
                    tokio::select! {
                        () = self.cancel.cancelled() => return Ok(None),
                        () = sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Reads frames until the connection ends, delivering every entry in
    /// arrival order and advancing the cursor after each delivery.
    async fn stream(&mut self, mut conn: C::Conn) -> Result<StreamOutcome> {
        let cancel = self.cancel.clone();
        loop {
            tokio::select! {
                // Closing: translate cancellation into a best-effort
                // close frame and terminate cleanly.
                () = cancel.cancelled() => {
                    debug!("tail cancelled, closing subscription");
                    conn.close().await;
                    return Ok(StreamOutcome::Closed);
                }
                frame = conn.next_frame() => match frame {
                    Ok(frame) => self.deliver(frame)?,
                    Err(e) if e.is_normal() => {
                        debug!("backend closed tail normally");
                        return Ok(StreamOutcome::Closed);
                    }
                    Err(e) if e.is_abnormal() => {
                        warn!(error = %e, "tail connection lost, reconnecting");
                        self.last_error = e.to_string();
                        conn.close().await;
                        return Ok(StreamOutcome::Reconnect);
                    }
                    Err(e) => return Err(ClientError::StreamRead(e.to_string())),
                }
            }
        }
    }

    fn deliver(&mut self, frame: TailFrame) -> Result<()> {
        for stream in frame.streams {
            for entry in stream.entries {
                self.sink.emit(entry.timestamp, &stream.labels, &entry.line)?;
                // Advance only after delivery; never rewind.
                if entry.timestamp > self.cursor {
                    self.cursor = entry.timestamp;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_carry_session_budget() {
        let options = TailOptions::default();

        assert_eq!(options.delay_for, Duration::ZERO);
        assert_eq!(options.reconnect.initial_delay, Duration::from_secs(1));
        assert_eq!(options.reconnect.max_delay, Duration::from_secs(10));
        assert_eq!(options.reconnect.max_attempts, 5);
    }
}
