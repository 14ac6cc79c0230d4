//! Port to multiplexer bookkeeping.
//!
//! The first session on a port binds the listener; the last one to stop
//! shuts it down.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wvdt::protocol::ResourcePath;
use wvdt::{NativeDebugger, SessionHost};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::mux::Multiplexer;
use crate::session::{self, SessionHandle};

/// What [`SessionRegistry::stop_session`] did to the port's listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
	/// That was the last session on the port; the listener is gone.
	ServerStopped,
	/// Other sessions still use the port; only this one was detached.
	Detached,
}

struct PortEntry {
	mux: Arc<Multiplexer>,
	tasks: HashMap<ResourcePath, JoinHandle<()>>,
}

pub struct SessionRegistry {
	config: ServerConfig,
	ports: Mutex<HashMap<u16, PortEntry>>,
}

impl SessionRegistry {
	pub fn new(config: ServerConfig) -> Self {
		Self {
			config,
			ports: Mutex::new(HashMap::new()),
		}
	}

	pub fn config(&self) -> &ServerConfig {
		&self.config
	}

	/// Starts a session for `instance_id` on `port`, binding the port first
	/// if no session uses it yet. Port `0` always binds a fresh listener.
	pub async fn start_session(
		&self,
		port: u16,
		instance_id: u32,
		adapter: Option<Box<dyn NativeDebugger>>,
		host: Arc<dyn SessionHost>,
	) -> Result<SessionHandle> {
		let mut ports = self.ports.lock().await;

		let existing = match port {
			0 => None,
			port => ports.get(&port).map(|entry| Arc::clone(&entry.mux)),
		};
		let mux = match existing {
			Some(mux) => mux,
			None => {
				let mux = Multiplexer::bind(&self.config.host, port).await?;
				ports.insert(
					mux.port(),
					PortEntry {
						mux: Arc::clone(&mux),
						tasks: HashMap::new(),
					},
				);
				mux
			}
		};

		let spawned = session::spawn(
			&mux,
			instance_id,
			self.config.translator.clone(),
			adapter,
			host,
			self.config.stop_timeout(),
		);
		let (handle, task) = match spawned {
			Ok(spawned) => spawned,
			Err(err) => {
				if mux.route_count() == 0 {
					ports.remove(&mux.port());
					mux.shutdown(self.config.stop_timeout()).await;
				}
				return Err(err);
			}
		};

		if let Some(entry) = ports.get_mut(&mux.port()) {
			entry.tasks.insert(handle.resource().clone(), task);
		}
		Ok(handle)
	}

	/// Tears the session down and detaches it from its port, stopping the
	/// listener when it was the last session there.
	pub async fn stop_session(&self, handle: &SessionHandle) -> Result<StopOutcome> {
		if let Err(err) = handle.stop().await {
			debug!(target = "wvdt.registry", resource = %handle.resource(), error = %err, "session already gone");
		}

		let mut ports = self.ports.lock().await;
		let port = handle.port();
		let Some(entry) = ports.get_mut(&port) else {
			warn!(target = "wvdt.registry", port, "stop for a port with no listener");
			return Ok(StopOutcome::Detached);
		};

		let unused = entry.mux.unregister(handle.resource());
		if let Some(task) = entry.tasks.remove(handle.resource()) {
			if let Err(err) = task.await {
				warn!(target = "wvdt.registry", error = %err, "session task failed");
			}
		}

		if !unused {
			return Ok(StopOutcome::Detached);
		}
		if let Some(entry) = ports.remove(&port) {
			entry.mux.shutdown(self.config.stop_timeout()).await;
		}
		info!(target = "wvdt.registry", port, "debug server shut down");
		Ok(StopOutcome::ServerStopped)
	}

	/// Ports with a running listener.
	pub async fn ports(&self) -> Vec<u16> {
		let mut ports: Vec<u16> = self.ports.lock().await.keys().copied().collect();
		ports.sort_unstable();
		ports
	}
}
