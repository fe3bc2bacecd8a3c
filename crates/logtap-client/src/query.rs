//! Query values and the tenant-scoped filter expression builder.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label key that scopes every expression to the caller's tenant.
pub const TENANT_LABEL: &str = "tenant";

/// Direction in which range results are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Oldest first.
    #[default]
    Forward,
    /// Newest first.
    Backward,
}

impl Direction {
    /// Returns the wire representation of this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

/// An immutable query, constructed once per invocation.
///
/// `end` must not precede `start`; that is a caller contract, not a
/// runtime check. A `limit` of zero means the backend default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Backend filter expression, built via [`selector`] or supplied by
    /// callers who already hold a valid expression.
    pub expression: String,
    /// Start of the time range (inclusive).
    pub start: DateTime<Utc>,
    /// End of the time range (inclusive).
    pub end: DateTime<Utc>,
    /// Maximum number of entries to return; zero means backend default.
    pub limit: u32,
    /// Evaluation step hint; zero means backend default.
    pub step: Duration,
    /// Batch interval hint; zero means backend default.
    pub interval: Duration,
    /// Result ordering.
    pub direction: Direction,
    /// Suppress per-query diagnostics.
    pub quiet: bool,
}

impl Query {
    /// Creates a query over the given expression and time range with
    /// default limit, step, interval, and direction.
    #[must_use]
    pub fn new(expression: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            expression: expression.into(),
            start,
            end,
            limit: 0,
            step: Duration::ZERO,
            interval: Duration::ZERO,
            direction: Direction::Forward,
            quiet: false,
        }
    }

    /// Sets the entry limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the evaluation step.
    #[must_use]
    pub const fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Sets the batch interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the result ordering.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Suppresses per-query diagnostics.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Builds a backend filter expression from one label matcher, scoped to
/// the caller's tenant.
///
/// Pure and total: label values are escaped, and the tenant label is
/// always present. Calling this without a meaningful tenant is a caller
/// programming error, not a runtime error.
#[must_use]
pub fn selector(label_key: &str, label_value: &str, tenant: &str) -> String {
    format!(
        "{{{label_key}=\"{value}\", {TENANT_LABEL}=\"{scope}\"}}",
        value = escape(label_value),
        scope = escape(tenant),
    )
}

/// Escapes backslashes and double quotes for use inside a quoted matcher.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test]
    fn selector_scopes_to_tenant() {
        assert_eq!(
            selector("app", "billing", "acme"),
            r#"{app="billing", tenant="acme"}"#
        );
    }

    #[test_case("plain", "plain"; "no escaping needed")]
    #[test_case(r#"has "quotes""#, r#"has \"quotes\""#; "quotes escaped")]
    #[test_case(r"back\slash", r"back\\slash"; "backslash escaped")]
    #[test_case(r#"\""#, r#"\\\""#; "both escaped")]
    fn selector_escapes_values(raw: &str, escaped: &str) {
        let expr = selector("app", raw, "acme");
        assert_eq!(expr, format!(r#"{{app="{escaped}", tenant="acme"}}"#));
    }

    #[test]
    fn query_defaults() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();
        let query = Query::new("{app=\"x\"}", start, end);

        assert_eq!(query.limit, 0);
        assert_eq!(query.step, Duration::ZERO);
        assert_eq!(query.interval, Duration::ZERO);
        assert_eq!(query.direction, Direction::Forward);
        assert!(!query.quiet);
    }

    #[test]
    fn query_builder_methods() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();
        let query = Query::new("{app=\"x\"}", start, end)
            .with_limit(500)
            .with_step(Duration::from_secs(30))
            .with_direction(Direction::Backward)
            .with_quiet(true);

        assert_eq!(query.limit, 500);
        assert_eq!(query.step, Duration::from_secs(30));
        assert_eq!(query.direction, Direction::Backward);
        assert!(query.quiet);
    }

    #[test]
    fn direction_wire_names() {
        assert_eq!(Direction::Forward.as_str(), "forward");
        assert_eq!(Direction::Backward.as_str(), "backward");
    }
}
