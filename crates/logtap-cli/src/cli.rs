//! Command-line argument parsing with clap.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Query and tail logs from a remote backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "logtap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, env = "LOGTAP_ADDR", default_value = "http://localhost:3100")]
    pub addr: String,

    /// Bearer token authorizing every call.
    #[arg(long, env = "LOGTAP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Tenant scope every query is bound to.
    #[arg(long, env = "LOGTAP_TENANT")]
    pub tenant: Option<String>,

    /// Output format: "default" or "json".
    #[arg(short, long, default_value = "default")]
    pub output: String,

    /// Suppress the label set in output.
    #[arg(long)]
    pub no_labels: bool,

    /// Only show labels with these keys (repeatable).
    #[arg(long = "include-label", value_name = "KEY")]
    pub include_labels: Vec<String>,

    /// Colorize human-readable output.
    #[arg(long)]
    pub color: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Retrieve logs for a bounded time range.
    Query(QueryArgs),

    /// Follow newly produced logs as they arrive.
    Tail(TailArgs),
}

/// Arguments for the query command.
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Label matcher as `key=value`.
    pub matcher: Option<String>,

    /// Raw selector expression; takes precedence over the matcher.
    #[arg(long, value_name = "EXPR")]
    pub selector: Option<String>,

    /// Start of the range (RFC 3339). Overrides --since.
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// End of the range (RFC 3339). Defaults to now.
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,

    /// Look back this far from the end of the range (e.g. 90s, 15m, 2h).
    #[arg(long, default_value = "1h", value_parser = parse_duration)]
    pub since: Duration,

    /// Maximum number of entries; 0 means backend default.
    #[arg(short, long, default_value_t = 0)]
    pub limit: u32,

    /// Return newest entries first.
    #[arg(long)]
    pub backward: bool,

    /// Retry until the backend returns records.
    #[arg(long)]
    pub retry: bool,

    /// Suppress per-query diagnostics.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the tail command.
#[derive(Parser, Debug, Clone)]
pub struct TailArgs {
    /// Label matcher as `key=value`.
    pub matcher: Option<String>,

    /// Raw selector expression; takes precedence over the matcher.
    #[arg(long, value_name = "EXPR")]
    pub selector: Option<String>,

    /// Start delivery this far in the past (e.g. 90s, 15m).
    #[arg(long, default_value = "0s", value_parser = parse_duration)]
    pub since: Duration,

    /// Let the backend delay delivery by this many seconds to batch
    /// late-arriving lines.
    #[arg(long, default_value_t = 0)]
    pub delay_for: u64,

    /// Maximum entries per delivery; 0 means backend default.
    #[arg(short, long, default_value_t = 0)]
    pub limit: u32,
}

/// Parses durations like `90s`, `15m`, `2h`, `1d`, or bare seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let (digits, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => value.split_at(idx),
        None => (value, "s"),
    };

    let count: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration: {value}"))?;

    let secs = match unit {
        "s" => count,
        "m" => count * 60,
        "h" => count * 60 * 60,
        "d" => count * 24 * 60 * 60,
        _ => return Err(format!("invalid duration unit: {unit}")),
    };

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn cli_parses_query_with_matcher() {
        let cli = Cli::parse_from(["logtap", "query", "app=billing"]);
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.matcher.as_deref(), Some("app=billing"));
                assert!(!args.retry);
            }
            Commands::Tail(_) => panic!("expected query command"),
        }
    }

    #[test]
    fn cli_parses_tail_with_delay() {
        let cli = Cli::parse_from(["logtap", "tail", "app=billing", "--delay-for", "5"]);
        match cli.command {
            Commands::Tail(args) => {
                assert_eq!(args.delay_for, 5);
                assert_eq!(args.since, Duration::ZERO);
            }
            Commands::Query(_) => panic!("expected tail command"),
        }
    }

    #[test]
    fn cli_respects_output_flag() {
        let cli = Cli::parse_from(["logtap", "--output", "json", "query", "app=x"]);
        assert_eq!(cli.output, "json");
    }

    #[test]
    fn cli_collects_label_allow_list() {
        let cli = Cli::parse_from([
            "logtap",
            "--include-label",
            "app",
            "--include-label",
            "pod",
            "query",
            "app=x",
        ]);
        assert_eq!(cli.include_labels, vec!["app", "pod"]);
    }

    #[test]
    fn query_accepts_explicit_bounds() {
        let cli = Cli::parse_from([
            "logtap",
            "query",
            "app=x",
            "--from",
            "2024-01-01T00:00:00Z",
            "--to",
            "2024-01-01T00:01:00Z",
            "--limit",
            "500",
            "--backward",
        ]);
        match cli.command {
            Commands::Query(args) => {
                assert!(args.from.is_some());
                assert!(args.to.is_some());
                assert_eq!(args.limit, 500);
                assert!(args.backward);
            }
            Commands::Tail(_) => panic!("expected query command"),
        }
    }

    #[test_case("90s", 90; "seconds")]
    #[test_case("15m", 900; "minutes")]
    #[test_case("2h", 7200; "hours")]
    #[test_case("1d", 86400; "days")]
    #[test_case("300", 300; "bare seconds")]
    fn duration_parsing(input: &str, secs: u64) {
        assert_eq!(
            parse_duration(input).expect("valid duration"),
            Duration::from_secs(secs)
        );
    }

    #[test_case(""; "empty")]
    #[test_case("abc"; "no digits")]
    #[test_case("5w"; "unknown unit")]
    #[test_case("-5s"; "negative")]
    fn duration_parsing_rejects(input: &str) {
        assert!(parse_duration(input).is_err());
    }
}
