//! HTTP implementation of the range-query transport.

use std::sync::Arc;
use std::time::Duration;

use chrono::SecondsFormat;
use reqwest::Url;
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::query::Query;
use crate::transport::{CredentialProvider, RangeTransport};
use crate::types::RangeResponse;

/// Header carrying the tenant scope on every call.
pub const TENANT_HEADER: &str = "X-Logtap-Tenant";

/// Path of the bounded range-query endpoint.
const RANGE_PATH: &str = "/api/v1/query_range";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Range-query client over HTTP.
///
/// Every call carries the bearer token and tenant scope supplied by the
/// credential provider.
pub struct HttpRangeClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for HttpRangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRangeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpRangeClient {
    /// Creates a client for the backend at the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not `http://` or `https://`, or if
    /// the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(TransportError::new(format!(
                "invalid backend URL: {base_url}, must start with http:// or https://"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Builds the range-query URL with all query parameters.
    fn range_url(&self, query: &Query) -> Result<Url, TransportError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query", query.expression.clone()),
            (
                "start",
                query.start.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ),
            ("end", query.end.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            ("direction", query.direction.as_str().to_string()),
        ];
        if query.limit > 0 {
            params.push(("limit", query.limit.to_string()));
        }
        if !query.step.is_zero() {
            params.push(("step", query.step.as_secs_f64().to_string()));
        }
        if !query.interval.is_zero() {
            params.push(("interval", query.interval.as_secs_f64().to_string()));
        }

        Url::parse_with_params(&format!("{}{RANGE_PATH}", self.base_url), &params)
            .map_err(|e| TransportError::new(format!("invalid query URL: {e}")))
    }
}

impl RangeTransport for HttpRangeClient {
    async fn query_range(&self, query: &Query) -> Result<RangeResponse, TransportError> {
        let url = self.range_url(query)?;
        trace!(url = %url, "sending range query");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.credentials.current_token())
            .header(TENANT_HEADER, self.credentials.current_tenant())
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(format!(
                "range query returned status {status}"
            )));
        }

        let body = response
            .json::<RangeResponse>()
            .await
            .map_err(|e| TransportError::new(format!("invalid response body: {e}")))?;

        debug!(
            streams = body.streams.len(),
            entries = body.entry_count(),
            "range query returned"
        );
        Ok(body)
    }
}
