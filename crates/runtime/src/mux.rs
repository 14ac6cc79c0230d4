//! One WebSocket listener per port, routing resource paths to sessions.
//!
//! Each registered resource path has at most one live front-end connection.
//! A new connection to a path evicts the previous one; upgrade requests for
//! paths nobody registered are answered with `404 Not Found`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::uri::PathAndQuery;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, trace, warn};
use wvdt_protocol::ResourcePath;

use crate::error::{Error, Result};
use crate::session::SessionCommand;

const REJECTED_REASON: &str = "No WebView debugger instance";
const EVICTED_REASON: &str = "New DevTools connected";
const STOPPED_REASON: &str = "Debug session stopped";

struct Connection {
	id: u64,
	tx: mpsc::UnboundedSender<Message>,
}

struct Route {
	session: mpsc::UnboundedSender<SessionCommand>,
	connection: Option<Connection>,
}

#[derive(Default)]
struct MuxState {
	routes: HashMap<ResourcePath, Route>,
	next_connection: u64,
}

impl MuxState {
	/// Makes a fresh connection the live one for `resource`, closing the
	/// previous one.
	fn attach(
		&mut self,
		resource: &ResourcePath,
		tx: mpsc::UnboundedSender<Message>,
	) -> Option<(u64, mpsc::UnboundedSender<SessionCommand>)> {
		self.next_connection += 1;
		let id = self.next_connection;
		let route = self.routes.get_mut(resource)?;
		if let Some(previous) = route.connection.replace(Connection { id, tx }) {
			info!(target = "wvdt.mux", resource = %resource, "evicting previous front-end");
			let _ = previous.tx.send(close(close_code::AWAY, EVICTED_REASON));
		}
		Some((id, route.session.clone()))
	}

	/// Drops connection `id` if it is still the live one.
	fn detach(&mut self, resource: &ResourcePath, id: u64) -> Option<mpsc::UnboundedSender<SessionCommand>> {
		let route = self.routes.get_mut(resource)?;
		if route.connection.as_ref().is_some_and(|conn| conn.id == id) {
			route.connection = None;
			return Some(route.session.clone());
		}
		None
	}

	fn is_live(&self, resource: &ResourcePath, id: u64) -> bool {
		self.routes
			.get(resource)
			.and_then(|route| route.connection.as_ref())
			.is_some_and(|conn| conn.id == id)
	}
}

type SharedState = Arc<Mutex<MuxState>>;

fn close(code: u16, reason: &str) -> Message {
	Message::Close(Some(CloseFrame {
		code,
		reason: reason.to_string().into(),
	}))
}

/// WebSocket listener shared by every session on one port.
pub struct Multiplexer {
	host: String,
	port: u16,
	state: SharedState,
	shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
	server: Mutex<Option<JoinHandle<()>>>,
}

impl Multiplexer {
	/// Binds `host:port` and starts serving. Port `0` picks a free port.
	pub async fn bind(host: &str, port: u16) -> Result<Arc<Self>> {
		let listener = TcpListener::bind((host, port))
			.await
			.map_err(|source| Error::Bind {
				addr: format!("{host}:{port}"),
				source,
			})?;
		let port = listener
			.local_addr()
			.map_err(|source| Error::Bind {
				addr: format!("{host}:{port}"),
				source,
			})?
			.port();

		let state: SharedState = Arc::new(Mutex::new(MuxState::default()));
		let app = Router::new().fallback(upgrade).with_state(Arc::clone(&state));

		let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
		let server = tokio::spawn(async move {
			let served = axum::serve(listener, app.into_make_service())
				.with_graceful_shutdown(async move {
					let _ = shutdown_rx.await;
				})
				.await;
			if let Err(err) = served {
				error!(target = "wvdt.mux", port, error = %err, "debug server failed");
			}
		});

		info!(target = "wvdt.mux", host, port, "debug server listening");

		Ok(Arc::new(Self {
			host: host.to_string(),
			port,
			state,
			shutdown_tx: Mutex::new(Some(shutdown_tx)),
			server: Mutex::new(Some(server)),
		}))
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	/// Port actually bound.
	pub fn port(&self) -> u16 {
		self.port
	}

	pub(crate) fn register(
		&self,
		resource: ResourcePath,
		session: mpsc::UnboundedSender<SessionCommand>,
	) -> Result<()> {
		let mut state = self.state.lock();
		if state.routes.contains_key(&resource) {
			return Err(Error::AlreadyBound(resource));
		}
		debug!(target = "wvdt.mux", port = self.port, resource = %resource, "resource registered");
		state.routes.insert(
			resource,
			Route {
				session,
				connection: None,
			},
		);
		Ok(())
	}

	/// Removes a route, closing its connection. Returns `true` when no routes remain.
	pub fn unregister(&self, resource: &ResourcePath) -> bool {
		let mut state = self.state.lock();
		if let Some(route) = state.routes.remove(resource) {
			if let Some(conn) = route.connection {
				let _ = conn.tx.send(close(close_code::NORMAL, STOPPED_REASON));
			}
			debug!(target = "wvdt.mux", port = self.port, resource = %resource, "resource unregistered");
		}
		state.routes.is_empty()
	}

	/// Delivers a frame to the front-end connected at `resource`.
	///
	/// `Ok(false)` when the path is registered but nobody is connected.
	pub fn send(&self, resource: &ResourcePath, text: String) -> Result<bool> {
		let state = self.state.lock();
		let route = state
			.routes
			.get(resource)
			.ok_or_else(|| Error::UnknownResource(resource.clone()))?;
		let Some(conn) = route.connection.as_ref() else {
			return Ok(false);
		};
		trace!(target = "wvdt.mux", resource = %resource, frame = %text, "to front-end");
		Ok(conn.tx.send(Message::Text(text.into())).is_ok())
	}

	pub fn is_connected(&self, resource: &ResourcePath) -> bool {
		self.state
			.lock()
			.routes
			.get(resource)
			.is_some_and(|route| route.connection.is_some())
	}

	pub fn route_count(&self) -> usize {
		self.state.lock().routes.len()
	}

	/// Closes every connection and stops the listener, waiting at most `timeout`.
	pub async fn shutdown(&self, timeout: Duration) {
		{
			let mut state = self.state.lock();
			for route in state.routes.values_mut() {
				if let Some(conn) = route.connection.take() {
					let _ = conn.tx.send(close(close_code::NORMAL, STOPPED_REASON));
				}
			}
		}
		if let Some(tx) = self.shutdown_tx.lock().take() {
			let _ = tx.send(());
		}
		let server = self.server.lock().take();
		if let Some(mut server) = server {
			if tokio::time::timeout(timeout, &mut server).await.is_err() {
				warn!(target = "wvdt.mux", port = self.port, "debug server did not stop in time, aborting");
				server.abort();
			}
		}
		info!(target = "wvdt.mux", port = self.port, "debug server stopped");
	}
}

async fn upgrade(ws: WebSocketUpgrade, uri: Uri, State(state): State<SharedState>) -> Response {
	let resource = ResourcePath::from_request(uri.path_and_query().map(PathAndQuery::as_str).unwrap_or("/"));
	if !state.lock().routes.contains_key(&resource) {
		warn!(target = "wvdt.mux", resource = %resource, "rejected connection to unknown resource");
		return (StatusCode::NOT_FOUND, REJECTED_REASON).into_response();
	}
	ws.on_upgrade(move |socket| handle_socket(socket, state, resource))
}

async fn handle_socket(mut socket: WebSocket, state: SharedState, resource: ResourcePath) {
	let (tx, rx) = mpsc::unbounded_channel();
	let attached = state.lock().attach(&resource, tx);
	// Unregistered between the upgrade request and now.
	let Some((id, session)) = attached else {
		warn!(target = "wvdt.mux", resource = %resource, "resource gone before the upgrade finished");
		let _ = socket.send(close(close_code::UNSUPPORTED, REJECTED_REASON)).await;
		return;
	};

	info!(target = "wvdt.mux", resource = %resource, connection = id, "front-end connected");
	let _ = session.send(SessionCommand::FrontendOpened);

	let mut rx_stream = UnboundedReceiverStream::new(rx);
	let (mut ws_tx, mut ws_rx) = socket.split();

	let send_task = tokio::spawn(async move {
		while let Some(msg) = rx_stream.next().await {
			let closing = matches!(msg, Message::Close(_));
			if ws_tx.send(msg).await.is_err() || closing {
				break;
			}
		}
	});

	while let Some(msg) = ws_rx.next().await {
		match msg {
			Ok(Message::Text(text)) => {
				if !state.lock().is_live(&resource, id) {
					break;
				}
				trace!(target = "wvdt.mux", resource = %resource, frame = %text.as_str(), "from front-end");
				if session.send(SessionCommand::FrontendMessage(text.to_string())).is_err() {
					break;
				}
			}
			Ok(Message::Close(_)) => break,
			Ok(_) => {}
			Err(err) => {
				warn!(target = "wvdt.mux", resource = %resource, error = %err, "front-end websocket error");
				break;
			}
		}
	}

	let detached = state.lock().detach(&resource, id);
	if let Some(session) = detached {
		let _ = session.send(SessionCommand::FrontendClosed);
	}

	send_task.abort();
	info!(target = "wvdt.mux", resource = %resource, connection = id, "front-end disconnected");
}
