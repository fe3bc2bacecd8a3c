//! In-process doubles shared by the integration suites.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use logtap_client::{
    Entry, LabeledStream, Query, RangeResponse, RangeTransport, TailConnection, TailConnector,
    TailFrame, TailReadError, TailRequest, TransportError,
};
use logtap_output::{Labels, LogSink};

/// Seconds past a fixed base instant.
pub fn ts(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(i64::from(secs))
}

/// A stream labeled `app=<label>` with the given (offset, line) entries.
pub fn stream(label: &str, entries: &[(u32, &str)]) -> LabeledStream {
    LabeledStream {
        labels: [("app".to_string(), label.to_string())].into(),
        entries: entries
            .iter()
            .map(|(secs, line)| Entry {
                timestamp: ts(*secs),
                line: (*line).to_string(),
            })
            .collect(),
    }
}

/// A well-formed streams response.
pub fn streams_response(streams: Vec<LabeledStream>) -> RangeResponse {
    RangeResponse {
        result_type: "streams".to_string(),
        streams,
    }
}

/// A tail frame carrying the given streams.
pub fn frame(streams: Vec<LabeledStream>) -> TailFrame {
    TailFrame { streams }
}

/// Sink recording every delivered record.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<(DateTime<Utc>, Labels, String)>>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<(DateTime<Utc>, Labels, String)> {
        self.records.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.2.clone()).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.records.lock().iter().map(|r| r.0).collect()
    }
}

impl LogSink for RecordingSink {
    fn emit(
        &mut self,
        timestamp: DateTime<Utc>,
        labels: &Labels,
        line: &str,
    ) -> std::io::Result<()> {
        self.records
            .lock()
            .push((timestamp, labels.clone(), line.to_string()));
        Ok(())
    }
}

/// Range transport replaying a scripted sequence of responses.
pub struct ScriptedRangeTransport {
    script: Mutex<VecDeque<Result<RangeResponse, TransportError>>>,
    calls: Mutex<u32>,
}

impl ScriptedRangeTransport {
    pub fn new(script: Vec<Result<RangeResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock()
    }
}

impl RangeTransport for ScriptedRangeTransport {
    async fn query_range(&self, _query: &Query) -> Result<RangeResponse, TransportError> {
        *self.calls.lock() += 1;
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("range script exhausted")))
    }
}

/// One scripted read on a tail connection.
pub enum Read {
    /// Deliver a frame.
    Frame(TailFrame),
    /// Backend closes the subscription cleanly.
    Normal,
    /// Connection tears down abnormally.
    Abnormal(&'static str),
    /// Unclassified read failure.
    Protocol(&'static str),
    /// Never resolves; parks the session in a blocked read.
    Pending,
}

/// One scripted connection attempt.
pub enum Connect {
    /// Connection established with the given read script.
    Ok(Vec<Read>),
    /// Connection attempt fails.
    Fail(&'static str),
}

/// Tail connector replaying a scripted sequence of connection attempts,
/// recording every request it sees.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<Connect>>,
    requests: Mutex<Vec<TailRequest>>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Connect>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every connect request, in order.
    pub fn requests(&self) -> Vec<TailRequest> {
        self.requests.lock().clone()
    }
}

impl TailConnector for ScriptedConnector {
    type Conn = ScriptedConnection;

    async fn connect(&self, request: &TailRequest) -> Result<ScriptedConnection, TransportError> {
        self.requests.lock().push(request.clone());
        match self.script.lock().pop_front() {
            Some(Connect::Ok(reads)) => Ok(ScriptedConnection {
                reads: reads.into(),
            }),
            Some(Connect::Fail(message)) => Err(TransportError::new(message)),
            None => Err(TransportError::new("connect script exhausted")),
        }
    }
}

/// Connection that plays back its read script.
pub struct ScriptedConnection {
    reads: VecDeque<Read>,
}

impl TailConnection for ScriptedConnection {
    async fn next_frame(&mut self) -> Result<TailFrame, TailReadError> {
        match self.reads.pop_front() {
            Some(Read::Frame(frame)) => Ok(frame),
            Some(Read::Normal) => Err(TailReadError::NormalClosure),
            Some(Read::Abnormal(message)) => Err(TailReadError::AbnormalClosure(message.to_string())),
            Some(Read::Protocol(message)) => Err(TailReadError::Protocol(message.to_string())),
            Some(Read::Pending) | None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {}
}
