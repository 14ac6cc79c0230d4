//! Resource paths and debug URLs.
//!
//! Every debuggable instance on a port is addressed by the resource part of
//! the WebSocket URL: the default instance (id `0`) lives at `/`, others at
//! `/?<instance>`. Front-ends are not always happy to open a first session
//! whose URL carries a query string, hence the bare root for instance `0`.

use std::fmt;

/// Scheme prefix of the front-end URL; the WebSocket address follows `ws=`.
pub const DEVTOOLS_URL_PREFIX: &str = "devtools://devtools/bundled/inspector.html?ws=";

/// Resource path a session is reachable at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
	pub fn for_instance(instance_id: u32) -> Self {
		if instance_id == 0 {
			Self("/".to_string())
		} else {
			Self(format!("/?{instance_id}"))
		}
	}

	/// Wraps the path+query of an incoming request as-is.
	pub fn from_request(path_and_query: &str) -> Self {
		Self(path_and_query.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Front-end URL for this resource.
	pub fn debug_url(&self, host: &str, port: u16) -> String {
		format!("{DEVTOOLS_URL_PREFIX}{host}:{port}{}", self.0)
	}

	/// Plain WebSocket URL for this resource.
	pub fn websocket_url(&self, host: &str, port: u16) -> String {
		format!("ws://{host}:{port}{}", self.0)
	}
}

impl fmt::Display for ResourcePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
