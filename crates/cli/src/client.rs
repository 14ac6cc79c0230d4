//! Minimal DevTools front-end over a WebSocket.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use wvdt_protocol::{FrameKind, Message, MessageId};

pub struct DevToolsClient {
	stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
	next_id: MessageId,
}

/// Response to one request and the events that arrived before it.
#[derive(Debug)]
pub struct Exchange {
	pub response: Message,
	pub events: Vec<Message>,
}

impl DevToolsClient {
	pub async fn connect(url: &str) -> Result<Self> {
		let (stream, _) = connect_async(url)
			.await
			.with_context(|| format!("Failed to connect to {url}"))?;
		debug!(target = "wvdt.client", url, "connected");
		Ok(Self { stream, next_id: 1 })
	}

	/// Sends a request and returns its id.
	pub async fn request(&mut self, method: &str, params: Option<Value>) -> Result<MessageId> {
		let id = self.next_id;
		self.next_id += 1;
		let frame = Message::request(id, method, params).to_string();
		trace!(target = "wvdt.client", frame = %frame, "send");
		self.stream
			.send(Frame::Text(frame))
			.await
			.context("Failed to send request")?;
		Ok(id)
	}

	/// Next protocol frame, `None` once the server closed the connection.
	pub async fn next_message(&mut self) -> Result<Option<Message>> {
		while let Some(frame) = self.stream.next().await {
			match frame.context("WebSocket error")? {
				Frame::Text(text) => {
					trace!(target = "wvdt.client", frame = %text, "recv");
					let message = Message::parse(&text).context("Server sent an invalid frame")?;
					return Ok(Some(message));
				}
				Frame::Close(Some(close)) if !close.reason.is_empty() => {
					bail!("Connection closed by server: {} ({})", close.reason, u16::from(close.code));
				}
				Frame::Close(_) => return Ok(None),
				_ => {}
			}
		}
		Ok(None)
	}

	/// Sends a request and waits for its response.
	pub async fn call(&mut self, method: &str, params: Option<Value>, timeout: Duration) -> Result<Exchange> {
		let id = self.request(method, params).await?;
		let mut events = Vec::new();
		let response = tokio::time::timeout(timeout, self.response_to(id, method, &mut events))
			.await
			.map_err(|_| anyhow!("Timed out after {}ms waiting for {method}", timeout.as_millis()))??;
		Ok(Exchange { response, events })
	}

	async fn response_to(&mut self, id: MessageId, method: &str, events: &mut Vec<Message>) -> Result<Message> {
		loop {
			let Some(message) = self.next_message().await? else {
				bail!("Connection closed before the response to {method}");
			};
			match message.kind() {
				FrameKind::Response if message.id() == Some(id) => return Ok(message),
				FrameKind::Event => events.push(message),
				_ => debug!(target = "wvdt.client", frame = %message, "ignoring frame"),
			}
		}
	}

	pub async fn close(mut self) -> Result<()> {
		self.stream.close(None).await.context("Failed to close connection")
	}
}
