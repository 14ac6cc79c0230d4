//! The session event loop.
//!
//! A session owns one [`ProtocolTranslator`] and runs it on a dedicated task.
//! Front-end frames, engine callbacks and host signals are all marshalled
//! onto that task as [`SessionCommand`]s, so the native debugger is only ever
//! touched from one place and engine replies never re-enter the translator.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use wvdt::protocol::{ConsoleApiType, ResourcePath, ScriptValue};
use wvdt::{ConsoleCall, DebugOnLoad, DebuggerState, NativeDebugger, ProtocolTranslator, SessionHost, TranslatorConfig};

use crate::error::{Error, Result};
use crate::mux::Multiplexer;

pub(crate) enum SessionCommand {
	FrontendOpened,
	FrontendClosed,
	FrontendMessage(String),
	AdapterMessage(String),
	ConsoleCall(ConsoleCall),
	PageReloading,
	ReloadPage,
	ReloadWith(DebugOnLoad),
	PageLoadComplete,
	DebugBreak,
	SetDebugOnLoad(DebugOnLoad),
	Status(oneshot::Sender<SessionStatus>),
	Stop(oneshot::Sender<()>),
}

/// Snapshot of a session's debugger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
	/// Native debugger present and enabled.
	pub enabled: bool,
	pub connected: bool,
	pub paused: bool,
	pub state: DebuggerState,
	pub debug_on_load: DebugOnLoad,
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
	tx: mpsc::UnboundedSender<SessionCommand>,
	resource: ResourcePath,
	instance_id: u32,
	host: String,
	port: u16,
}

impl std::fmt::Debug for SessionHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionHandle")
			.field("resource", &self.resource)
			.field("port", &self.port)
			.finish()
	}
}

impl SessionHandle {
	pub fn instance_id(&self) -> u32 {
		self.instance_id
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn resource(&self) -> &ResourcePath {
		&self.resource
	}

	/// Front-end URL for this session.
	pub fn debug_url(&self) -> String {
		self.resource.debug_url(&self.host, self.port)
	}

	pub fn websocket_url(&self) -> String {
		self.resource.websocket_url(&self.host, self.port)
	}

	fn send(&self, command: SessionCommand) -> Result<()> {
		self.tx.send(command).map_err(|_| Error::SessionClosed)
	}

	/// Hands an intercepted console call to the session, stamped with the
	/// current wall-clock time.
	pub fn console_call(&self, kind: ConsoleApiType, args: Vec<ScriptValue>) -> Result<()> {
		let timestamp_ms = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_secs_f64() * 1000.0)
			.unwrap_or_default();
		self.send(SessionCommand::ConsoleCall(ConsoleCall::new(kind, args, timestamp_ms)))
	}

	/// Announces a reload the host drives itself.
	pub fn page_reloading(&self) -> Result<()> {
		self.send(SessionCommand::PageReloading)
	}

	/// Reloads the page through the debugger.
	pub fn reload_page(&self) -> Result<()> {
		self.send(SessionCommand::ReloadPage)
	}

	pub fn reload_with(&self, mode: DebugOnLoad) -> Result<()> {
		self.send(SessionCommand::ReloadWith(mode))
	}

	pub fn page_load_complete(&self) -> Result<()> {
		self.send(SessionCommand::PageLoadComplete)
	}

	pub fn debug_break(&self) -> Result<()> {
		self.send(SessionCommand::DebugBreak)
	}

	pub fn set_debug_on_load(&self, mode: DebugOnLoad) -> Result<()> {
		self.send(SessionCommand::SetDebugOnLoad(mode))
	}

	pub async fn status(&self) -> Result<SessionStatus> {
		let (tx, rx) = oneshot::channel();
		self.send(SessionCommand::Status(tx))?;
		rx.await.map_err(|_| Error::SessionClosed)
	}

	pub async fn is_connected(&self) -> Result<bool> {
		Ok(self.status().await?.connected)
	}

	pub async fn is_paused(&self) -> Result<bool> {
		Ok(self.status().await?.paused)
	}

	pub async fn debug_on_load(&self) -> Result<DebugOnLoad> {
		Ok(self.status().await?.debug_on_load)
	}

	/// Tears the translator down and waits for the event loop to finish it.
	pub(crate) async fn stop(&self) -> Result<()> {
		let (tx, rx) = oneshot::channel();
		self.send(SessionCommand::Stop(tx))?;
		rx.await.map_err(|_| Error::SessionClosed)
	}
}

struct SessionLoop {
	translator: ProtocolTranslator,
	mux: Arc<Multiplexer>,
	resource: ResourcePath,
	stop_timeout: Duration,
}

/// Registers `instance_id` on `mux` and spawns its event loop.
pub(crate) fn spawn(
	mux: &Arc<Multiplexer>,
	instance_id: u32,
	config: TranslatorConfig,
	adapter: Option<Box<dyn NativeDebugger>>,
	host: Arc<dyn SessionHost>,
	stop_timeout: Duration,
) -> Result<(SessionHandle, JoinHandle<()>)> {
	let resource = ResourcePath::for_instance(instance_id);
	let (tx, rx) = mpsc::unbounded_channel();
	mux.register(resource.clone(), tx.clone())?;

	let mut translator = ProtocolTranslator::new(config, adapter, host);
	let callback_tx = tx.clone();
	let started = translator.start(Box::new(move |text| {
		let _ = callback_tx.send(SessionCommand::AdapterMessage(text));
	}));
	if let Err(err) = started {
		warn!(target = "wvdt.session", resource = %resource, error = %err, "session running without a debugger");
	}

	let handle = SessionHandle {
		tx,
		resource: resource.clone(),
		instance_id,
		host: mux.host().to_string(),
		port: mux.port(),
	};
	info!(target = "wvdt.session", url = %handle.debug_url(), "debug session created");

	let session = SessionLoop {
		translator,
		mux: Arc::clone(mux),
		resource,
		stop_timeout,
	};
	let task = tokio::spawn(session.run(rx));
	Ok((handle, task))
}

impl SessionLoop {
	async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionCommand>) {
		// Flush whatever `start` queued.
		self.flush();

		while let Some(command) = rx.recv().await {
			if let ControlFlow::Break(done) = self.dispatch(command) {
				self.teardown(&mut rx).await;
				let _ = done.send(());
				info!(target = "wvdt.session", resource = %self.resource, "debug session stopped");
				return;
			}
			self.flush();
		}
		debug!(target = "wvdt.session", resource = %self.resource, "all handles dropped");
	}

	/// Applies one command. `Break` carries the acknowledgement of a stop request.
	fn dispatch(&mut self, command: SessionCommand) -> ControlFlow<oneshot::Sender<()>> {
		let translator = &mut self.translator;
		let outcome = match command {
			SessionCommand::FrontendOpened => {
				translator.connection_opened();
				Ok(())
			}
			SessionCommand::FrontendClosed => {
				translator.connection_closed();
				Ok(())
			}
			SessionCommand::FrontendMessage(text) => translator.handle_frontend_message(&text),
			SessionCommand::AdapterMessage(text) => translator.handle_adapter_message(&text),
			SessionCommand::ConsoleCall(call) => {
				translator.console_call(call);
				Ok(())
			}
			SessionCommand::PageReloading => {
				if translator.is_connected() {
					translator.page_reloading();
				}
				Ok(())
			}
			SessionCommand::ReloadPage => {
				translator.reload_page();
				Ok(())
			}
			SessionCommand::ReloadWith(mode) => {
				translator.reload_with(mode);
				Ok(())
			}
			SessionCommand::PageLoadComplete => {
				translator.page_load_complete();
				Ok(())
			}
			SessionCommand::DebugBreak => {
				translator.debug_break();
				Ok(())
			}
			SessionCommand::SetDebugOnLoad(mode) => {
				translator.set_debug_on_load(mode);
				Ok(())
			}
			SessionCommand::Status(reply) => {
				let _ = reply.send(self.status());
				Ok(())
			}
			SessionCommand::Stop(done) => return ControlFlow::Break(done),
		};
		if let Err(err) = outcome {
			warn!(target = "wvdt.session", resource = %self.resource, error = %err, "dropped message");
		}
		ControlFlow::Continue(())
	}

	fn status(&self) -> SessionStatus {
		let translator = &self.translator;
		SessionStatus {
			enabled: translator.is_enabled(),
			connected: translator.is_connected(),
			paused: translator.is_paused(),
			state: translator.state(),
			debug_on_load: translator.debug_on_load(),
		}
	}

	/// Sends queued frames to the front-end, then runs queued page evaluations.
	fn flush(&mut self) {
		self.deliver();
		self.translator.run_deferred();
		self.deliver();
	}

	fn deliver(&mut self) {
		for frame in self.translator.take_frontend_messages() {
			match self.mux.send(&self.resource, frame) {
				Ok(true) => {}
				Ok(false) => trace!(target = "wvdt.session", resource = %self.resource, "no front-end, frame dropped"),
				Err(err) => {
					warn!(target = "wvdt.session", resource = %self.resource, error = %err, "frame undeliverable");
				}
			}
		}
	}

	/// Removes breakpoints, resumes, and disables the debugger once the
	/// engine confirms the resume. Gives up waiting after the stop timeout.
	async fn teardown(&mut self, rx: &mut mpsc::UnboundedReceiver<SessionCommand>) {
		self.translator.begin_teardown();
		self.flush();

		let deadline = tokio::time::sleep(self.stop_timeout);
		tokio::pin!(deadline);
		while self.translator.teardown_pending() {
			tokio::select! {
				command = rx.recv() => match command {
					Some(SessionCommand::AdapterMessage(text)) => {
						if let Err(err) = self.translator.handle_adapter_message(&text) {
							warn!(target = "wvdt.session", error = %err, "dropped message during teardown");
						}
						self.flush();
					}
					Some(SessionCommand::Status(reply)) => {
						let _ = reply.send(self.status());
					}
					Some(SessionCommand::Stop(done)) => {
						let _ = done.send(());
					}
					Some(_) => {}
					None => break,
				},
				_ = &mut deadline => {
					warn!(target = "wvdt.session", resource = %self.resource, "engine did not resume, disabling anyway");
					break;
				}
			}
		}
		if self.translator.teardown_pending() {
			self.translator.force_disable();
		}
		self.deliver();
	}
}
