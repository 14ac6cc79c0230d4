//! Seams to the embedding host.
//!
//! [`NativeDebugger`] wraps the engine's private debugger surface and
//! [`SessionHost`] receives lifecycle notifications. Both are implemented by
//! the embedding application; the translator never calls them off its own
//! thread.

use wvdt_protocol::{ScriptException, ScriptValue};

/// Callback receiving raw messages emitted by the engine's debugger.
pub type MessageCallback = Box<dyn FnMut(String) + Send>;

/// The engine's raw debugger interface.
///
/// Not thread-safe: the owner must drive every call from one thread.
pub trait NativeDebugger: Send {
	fn set_enabled(&mut self, enabled: bool);

	fn is_enabled(&self) -> bool;

	/// Hands a protocol message to the engine. Replies arrive through the
	/// message callback, possibly before this call returns.
	fn send_message(&mut self, message: &str);

	/// Registers the single inbound message callback, replacing any previous one.
	fn set_message_callback(&mut self, callback: Option<MessageCallback>);

	/// Evaluates a script in the page through the host scripting bridge.
	fn evaluate(&mut self, script: &str) -> Result<ScriptValue, ScriptException>;

	/// Reloads the page without involving the debugger.
	fn reload(&mut self);
}

/// Notifications the translator sends to the embedding application.
pub trait SessionHost: Send + Sync {
	fn connection_opened(&self) {}

	fn connection_closed(&self) {}

	/// A page reload started that the host did not announce through
	/// [`ProtocolTranslator::page_reloading`](crate::ProtocolTranslator::page_reloading).
	/// The helper script has been injected; the host may connect its bridge.
	fn page_reload_started(&self) {}

	/// Script evaluated in every new page context to install the page-side helper.
	fn helper_script(&self) -> Option<String> {
		None
	}
}

/// Host that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl SessionHost for NoopHost {}
