//! WebSocket implementation of the tail transport.

use std::sync::Arc;

use chrono::SecondsFormat;
use futures::StreamExt;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::TransportError;
use crate::http::TENANT_HEADER;
use crate::transport::{CredentialProvider, TailConnection, TailConnector, TailReadError, TailRequest};
use crate::types::TailFrame;

/// Path of the tail subscription endpoint.
const TAIL_PATH: &str = "/api/v1/tail";

/// Opens tail subscriptions over WebSocket.
pub struct WsTailConnector {
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for WsTailConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTailConnector")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WsTailConnector {
    /// Creates a connector for the backend at the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not `ws://` or `wss://`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.into();
        if !base_url.starts_with("ws://") && !base_url.starts_with("wss://") {
            return Err(TransportError::new(format!(
                "invalid tail URL: {base_url}, must start with ws:// or wss://"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Builds the subscription URL with all query parameters.
    fn tail_url(&self, request: &TailRequest) -> Result<Url, TransportError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query", request.expression.clone()),
            (
                "start",
                request.start.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ),
        ];
        if request.limit > 0 {
            params.push(("limit", request.limit.to_string()));
        }
        if !request.delay_for.is_zero() {
            params.push(("delay_for", request.delay_for.as_secs().to_string()));
        }

        Url::parse_with_params(&format!("{}{TAIL_PATH}", self.base_url), &params)
            .map_err(|e| TransportError::new(format!("invalid tail URL: {e}")))
    }
}

impl TailConnector for WsTailConnector {
    type Conn = WsTailConnection;

    async fn connect(&self, request: &TailRequest) -> Result<WsTailConnection, TransportError> {
        let url = self.tail_url(request)?;

        let mut handshake = url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::new(format!("invalid handshake request: {e}")))?;
        let headers = handshake.headers_mut();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", self.credentials.current_token())
                .parse()
                .map_err(|e| TransportError::new(format!("invalid bearer token: {e}")))?,
        );
        headers.insert(
            TENANT_HEADER,
            self.credentials
                .current_tenant()
                .parse()
                .map_err(|e| TransportError::new(format!("invalid tenant: {e}")))?,
        );

        debug!(url = %url, "opening tail subscription");
        let (ws, _response) = connect_async(handshake)
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(WsTailConnection { ws })
    }
}

/// One established tail subscription over WebSocket.
pub struct WsTailConnection {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TailConnection for WsTailConnection {
    async fn next_frame(&mut self) -> Result<TailFrame, TailReadError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text)
                        .map_err(|e| TailReadError::Protocol(format!("invalid frame: {e}")));
                }
                Some(Ok(Message::Close(frame))) => return Err(classify_close(frame)),
                Some(Ok(Message::Binary(_))) => {
                    return Err(TailReadError::Protocol(
                        "unexpected binary message".to_string(),
                    ));
                }
                // Keepalive traffic and raw frames carry no records.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(classify_error(&e)),
                None => return Err(TailReadError::NormalClosure),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Classifies a received close frame.
fn classify_close(frame: Option<CloseFrame<'_>>) -> TailReadError {
    match frame {
        Some(f) if f.code == CloseCode::Normal => TailReadError::NormalClosure,
        Some(f) => TailReadError::AbnormalClosure(format!(
            "close code {}: {}",
            u16::from(f.code),
            f.reason
        )),
        None => TailReadError::NormalClosure,
    }
}

/// Classifies a transport-level read failure.
fn classify_error(error: &WsError) -> TailReadError {
    match error {
        WsError::ConnectionClosed => TailReadError::NormalClosure,
        WsError::Io(e) => TailReadError::AbnormalClosure(format!("I/O failure: {e}")),
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            TailReadError::AbnormalClosure("connection reset without close handshake".to_string())
        }
        other => TailReadError::Protocol(other.to_string()),
    }
}
