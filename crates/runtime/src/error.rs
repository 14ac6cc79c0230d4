//! Error types for the session runtime.

use thiserror::Error;
use wvdt_protocol::ResourcePath;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The listener for a port could not be bound.
	#[error("failed to bind debug server to {addr}")]
	Bind {
		addr: String,
		#[source]
		source: std::io::Error,
	},

	/// A message was addressed to a resource path that was never registered.
	#[error("no session registered at resource {0}")]
	UnknownResource(ResourcePath),

	/// Another session already serves this resource path on the port.
	#[error("resource {0} is already handled by another session")]
	AlreadyBound(ResourcePath),

	/// The session's event loop has exited.
	#[error("session closed")]
	SessionClosed,

	#[error(transparent)]
	Translator(#[from] wvdt::Error),
}
