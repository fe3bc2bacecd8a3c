//! Command dispatch for `query` and `tail`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use logtap_client::{
    query_range, query_range_with_retry, selector, tail, CredentialProvider, Direction,
    HttpRangeClient, Query, WsTailConnector,
};
use logtap_output::{LogSink, SinkConfig};

use crate::cli::{Cli, QueryArgs, TailArgs};
use crate::credentials::EnvCredentials;
use crate::error::CliError;

/// Runs a one-shot range query against the backend.
pub async fn run_query(cli: &Cli, args: &QueryArgs) -> Result<(), CliError> {
    let credentials = Arc::new(EnvCredentials::new(cli.token.clone(), cli.tenant.clone())?);
    let expression = resolve_expression(
        args.selector.as_deref(),
        args.matcher.as_deref(),
        &credentials.current_tenant(),
    )?;
    let (start, end) = resolve_range(args.since, args.from, args.to)?;

    let direction = if args.backward {
        Direction::Backward
    } else {
        Direction::Forward
    };
    let query = Query::new(expression, start, end)
        .with_limit(args.limit)
        .with_direction(direction)
        .with_quiet(args.quiet);

    let transport = HttpRangeClient::new(cli.addr.as_str(), credentials)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let mut sink = build_sink(cli)?;

    if args.retry {
        query_range_with_retry(&transport, &mut sink, &query).await?;
    } else {
        query_range(&transport, &mut sink, &query).await?;
    }
    Ok(())
}

/// Runs a live tail session until Ctrl-C, a backend normal closure, or
/// an unrecoverable error.
pub async fn run_tail(cli: &Cli, args: &TailArgs) -> Result<(), CliError> {
    let credentials = Arc::new(EnvCredentials::new(cli.token.clone(), cli.tenant.clone())?);
    let expression = resolve_expression(
        args.selector.as_deref(),
        args.matcher.as_deref(),
        &credentials.current_tenant(),
    )?;

    let since = chrono::Duration::from_std(args.since)
        .map_err(|e| CliError::InvalidArgument(format!("--since out of range: {e}")))?;
    let start = Utc::now() - since;
    // The tail path only reads expression, limit, and start.
    let query = Query::new(expression, start, start).with_limit(args.limit);

    let connector = WsTailConnector::new(ws_addr(&cli.addr), credentials)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let mut sink = build_sink(cli)?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling tail");
            signal_cancel.cancel();
        }
    });

    tail(
        &connector,
        cancel,
        Duration::from_secs(args.delay_for),
        &mut sink,
        &query,
    )
    .await?;
    Ok(())
}

/// Maps the backend base URL onto its WebSocket counterpart.
fn ws_addr(addr: &str) -> String {
    if let Some(rest) = addr.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = addr.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        addr.to_string()
    }
}

/// Parses a `key=value` label matcher.
fn parse_matcher(matcher: &str) -> Result<(&str, &str), CliError> {
    match matcher.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok((key, value)),
        _ => Err(CliError::InvalidArgument(format!(
            "label matcher must be key=value, got: {matcher}"
        ))),
    }
}

/// Resolves the filter expression: a raw selector wins, otherwise the
/// matcher is built into a tenant-scoped expression.
fn resolve_expression(
    raw: Option<&str>,
    matcher: Option<&str>,
    tenant: &str,
) -> Result<String, CliError> {
    if let Some(expression) = raw {
        return Ok(expression.to_string());
    }
    let matcher = matcher.ok_or_else(|| {
        CliError::InvalidArgument("a label matcher or --selector is required".to_string())
    })?;
    let (key, value) = parse_matcher(matcher)?;
    Ok(selector(key, value, tenant))
}

/// Resolves the query time range from --since/--from/--to.
fn resolve_range(
    since: Duration,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), CliError> {
    let end = to.unwrap_or_else(Utc::now);
    let start = match from {
        Some(from) => from,
        None => {
            let since = chrono::Duration::from_std(since)
                .map_err(|e| CliError::InvalidArgument(format!("--since out of range: {e}")))?;
            end - since
        }
    };

    if start > end {
        return Err(CliError::InvalidArgument(format!(
            "range start {start} is after end {end}"
        )));
    }
    Ok((start, end))
}

/// Builds the output sink from the top-level flags.
fn build_sink(cli: &Cli) -> Result<Box<dyn LogSink + Send>, CliError> {
    let format = cli.output.parse()?;
    let config = SinkConfig {
        format,
        no_labels: cli.no_labels,
        allow_labels: (!cli.include_labels.is_empty()).then(|| cli.include_labels.clone()),
        color: cli.color,
    };
    Ok(config.build(Box::new(io::stdout())))
}
