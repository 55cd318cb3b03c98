//! WebSocket transport backed by tokio-tungstenite

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{FrameTransport, TransportConnector, TransportError};
use crate::protocol::GatewayFrame;

/// Connects WebSocket transports to a fixed gateway URL
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Create a connector for the given `ws://` or `wss://` URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl TransportConnector for WebSocketConnector {
    async fn connect(&self) -> Result<Box<dyn FrameTransport>, TransportError> {
        let (stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(url = %self.url, "WebSocket connection established");

        Ok(Box::new(WebSocketTransport { stream }))
    }
}

/// A live WebSocket gateway connection
struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameTransport for WebSocketTransport {
    async fn next_frame(&mut self) -> Result<Option<GatewayFrame>, TransportError> {
        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => return Err(TransportError::Io(e.to_string())),
                None => return Ok(None),
            };

            match message {
                Message::Text(text) => {
                    return GatewayFrame::from_json(&text)
                        .map(Some)
                        .map_err(|e| TransportError::Decode(e.to_string()));
                }
                Message::Binary(_) => {
                    return Err(TransportError::Decode(
                        "binary frames are not supported".to_string(),
                    ));
                }
                // Pongs are produced by tungstenite itself; both are noise here
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(close_frame) => {
                    let code = close_frame.map(|cf| u16::from(cf.code));
                    tracing::debug!(code = ?code, "WebSocket closed by peer");
                    if let Some(code) = code {
                        return Err(TransportError::Closed { code: Some(code) });
                    }
                    return Ok(None);
                }
                Message::Frame(_) => continue,
            }
        }
    }

    async fn send_frame(&mut self, frame: &GatewayFrame) -> Result<(), TransportError> {
        let json = frame
            .to_json()
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        self.stream
            .send(Message::Text(json))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // An error here usually means the socket is already gone
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close failed (already closed?)");
        }
        Ok(())
    }
}
