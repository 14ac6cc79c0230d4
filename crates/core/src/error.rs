//! Error types for the protocol translator.

use thiserror::Error;

/// Result type alias for translator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`ProtocolTranslator`](crate::ProtocolTranslator).
///
/// Script evaluation failures are not errors here: they are reshaped into
/// protocol error objects and delivered to the front-end.
#[derive(Debug, Error)]
pub enum Error {
	/// A frame that is not a JSON object.
	#[error("invalid protocol frame: {0}")]
	InvalidFrame(#[from] serde_json::Error),

	/// A DOM mutation notification the shadow tree could not apply.
	///
	/// Only returned under [`DomMutationPolicy::Reject`](crate::DomMutationPolicy::Reject).
	#[error("malformed {method} notification: {reason}")]
	MalformedDomNotification { method: String, reason: String },

	/// The embedded engine exposes no debugger.
	#[error("native debugger unavailable")]
	AdapterUnavailable,
}
