//! WebSocket connector backed by `tokio-tungstenite`.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::AppError;

use super::{Connection, Connector};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, AppError> {
        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| AppError::Transport(format!("connect {}: {e}", self.url)))?;
        let (sink, source) = stream.split();
        Ok(Box::new(WsConnection { sink, source }))
    }
}

struct WsConnection {
    sink: SplitSink<WsStream, WsMessage>,
    source: SplitStream<WsStream>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, text: String) -> Result<(), AppError> {
        self.sink
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| AppError::Transport(format!("ws send: {e}")))
    }

    async fn recv(&mut self) -> Option<Result<String, AppError>> {
        // Skip non-text frames (ping/pong are answered by the protocol
        // layer, binary is not part of this protocol).
        loop {
            match self.source.next().await? {
                Ok(WsMessage::Text(text)) => return Some(Ok(text.to_string())),
                Ok(WsMessage::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(AppError::Transport(format!("ws recv: {e}")))),
            }
        }
    }
}
