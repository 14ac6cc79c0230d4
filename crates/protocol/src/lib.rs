//! Wire types for the WebView DevTools bridge.
//!
//! This crate holds the shapes of data exchanged between a DevTools front-end,
//! the bridge, and the embedded engine's debugger. It performs no I/O.
//!
//! # Main Types
//!
//! - [`Message`] - an untyped protocol frame with envelope accessors
//! - [`EvaluateParams`], [`SetBreakpointByUrlParams`], [`PausedParams`] - typed
//!   views over the payloads the bridge rewrites
//! - [`ScriptValue`] / [`ScriptException`] - values crossing the host script bridge
//! - [`ConsoleApiType`] - console call kinds
//! - [`ResourcePath`] - per-instance WebSocket resource and debug URL

pub mod console;
pub mod message;
pub mod resource;
pub mod script;
pub mod types;

#[cfg(test)]
mod tests;

pub use console::ConsoleApiType;
pub use message::{FrameKind, Message, MessageId};
pub use resource::{DEVTOOLS_URL_PREFIX, ResourcePath};
pub use script::{ScriptException, ScriptValue};
pub use types::*;
