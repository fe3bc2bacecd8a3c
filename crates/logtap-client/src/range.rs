//! Bounded range queries, merged into chronological order.

use logtap_output::LogSink;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::error::{ClientError, Result};
use crate::query::Query;
use crate::transport::RangeTransport;
use crate::types::{LogRecord, RangeResponse, RESULT_TYPE_STREAMS};

/// Executes one range query and delivers every matching entry to the
/// sink in timestamp order.
///
/// The backend does not guarantee global ordering across streams, so the
/// entries of all returned streams are flattened and stable-sorted by
/// timestamp before delivery.
///
/// # Errors
///
/// Propagates the transport failure of the single call, or
/// [`ClientError::UnsupportedResult`] when the response's result type is
/// not the streams shape.
pub async fn query_range<T, S>(transport: &T, sink: &mut S, query: &Query) -> Result<()>
where
    T: RangeTransport,
    S: LogSink + ?Sized,
{
    let response = transport
        .query_range(query)
        .await
        .map_err(ClientError::Query)?;

    let records = flatten_sorted(response)?;
    if !query.quiet {
        debug!(records = records.len(), "range query complete");
    }
    deliver(sink, &records)
}

/// Executes a range query, retrying until it produces records or the
/// attempt budget is exhausted.
///
/// An attempt is retried when the transport call fails, or when it
/// returns zero records — an empty result is indistinguishable from
/// backend indexing lag, and this operation bets on retrying. A
/// legitimately empty range therefore pays the full backoff cost before
/// returning success with nothing emitted.
///
/// # Errors
///
/// Returns [`ClientError::RetriesExhausted`] once the budget is spent on
/// transport failures, or [`ClientError::UnsupportedResult`] immediately
/// on a result shape this client cannot flatten.
pub async fn query_range_with_retry<T, S>(transport: &T, sink: &mut S, query: &Query) -> Result<()>
where
    T: RangeTransport,
    S: LogSink + ?Sized,
{
    let policy = BackoffPolicy::range_retry();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match transport.query_range(query).await {
            Ok(response) => {
                let records = flatten_sorted(response)?;
                if !records.is_empty() {
                    return deliver(sink, &records);
                }
                if !policy.should_retry(attempt) {
                    if !query.quiet {
                        debug!(attempts = attempt, "range query empty after all attempts");
                    }
                    return Ok(());
                }
                debug!(attempt, "range query returned no records, retrying");
            }
            Err(e) => {
                if !policy.should_retry(attempt) {
                    return Err(ClientError::RetriesExhausted {
                        attempts: attempt,
                        source: e,
                    });
                }
                warn!(attempt, error = %e, "range query failed, retrying");
            }
        }

        let delay = policy.delay_for_attempt(attempt);
        sleep(delay).await;
    }
}

/// Flattens every stream of a response into one timestamp-sorted record
/// sequence, keeping arrival order between equal timestamps.
fn flatten_sorted(response: RangeResponse) -> Result<Vec<LogRecord>> {
    if response.result_type != RESULT_TYPE_STREAMS {
        return Err(ClientError::UnsupportedResult(response.result_type));
    }

    let mut records: Vec<LogRecord> = response
        .streams
        .into_iter()
        .flat_map(|stream| {
            let labels = stream.labels;
            stream
                .entries
                .into_iter()
                .map(move |entry| LogRecord {
                    timestamp: entry.timestamp,
                    labels: labels.clone(),
                    line: entry.line,
                })
        })
        .collect();

    // sort_by_key is stable, so ties keep arrival order.
    records.sort_by_key(|record| record.timestamp);
    Ok(records)
}

fn deliver<S: LogSink + ?Sized>(sink: &mut S, records: &[LogRecord]) -> Result<()> {
    for record in records {
        sink.emit(record.timestamp, &record.labels, &record.line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone, Utc};
    use logtap_output::Labels;

    use crate::types::{Entry, LabeledStream};

    fn ts(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(i64::from(secs))
    }

    fn stream(label: &str, entries: &[(u32, &str)]) -> LabeledStream {
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

    fn streams_response(streams: Vec<LabeledStream>) -> RangeResponse {
        RangeResponse {
            result_type: RESULT_TYPE_STREAMS.to_string(),
            streams,
        }
    }

    #[test]
    fn interleaved_streams_merge_chronologically() {
        let response = streams_response(vec![
            stream("a", &[(10, "a1"), (40, "a2")]),
            stream("b", &[(5, "b1")]),
        ]);

        let records = flatten_sorted(response).expect("streams shape");
        let lines: Vec<&str> = records.iter().map(|r| r.line.as_str()).collect();
        assert_eq!(lines, vec!["b1", "a1", "a2"]);
    }

    #[test]
    fn equal_timestamps_keep_arrival_order() {
        let response = streams_response(vec![
            stream("a", &[(10, "first"), (10, "second")]),
            stream("b", &[(10, "third")]),
        ]);

        let records = flatten_sorted(response).expect("streams shape");
        let lines: Vec<&str> = records.iter().map(|r| r.line.as_str()).collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn records_carry_their_stream_labels() {
        let response = streams_response(vec![stream("billing", &[(10, "a1")])]);

        let records = flatten_sorted(response).expect("streams shape");
        let expected: Labels = [("app".to_string(), "billing".to_string())].into();
        assert_eq!(records[0].labels, expected);
    }

    #[test]
    fn unknown_result_type_is_unsupported() {
        let response = RangeResponse {
            result_type: "matrix".to_string(),
            streams: Vec::new(),
        };

        let err = flatten_sorted(response).unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedResult(kind) if kind == "matrix"));
    }

    #[test]
    fn empty_response_flattens_to_nothing() {
        let records = flatten_sorted(streams_response(Vec::new())).expect("streams shape");
        assert!(records.is_empty());
    }
}
