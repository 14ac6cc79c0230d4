//! DevTools protocol translation for embedded WebView debuggers.
//!
//! An embedded engine's debugger speaks an incomplete dialect of the DevTools
//! protocol through a single callback. [`ProtocolTranslator`] turns that into
//! something a stock front-end can drive:
//!
//! - request ids are remapped so translator-issued requests never collide
//!   with front-end ids
//! - unsupported methods are substituted or answered locally
//! - evaluations in the page context bypass the engine's lossy evaluate
//! - breakpoints are cached and always removed before the engine is released
//! - console calls are resolved in a pause/evaluate/resume cycle and emitted
//!   as `Runtime.consoleAPICalled` in call order
//!
//! The crate performs no I/O. `wvdt-runtime` owns the event loop and sockets.

pub mod adapter;
pub mod breakpoints;
pub mod config;
pub mod console;
pub mod context;
pub mod dom;
pub mod error;
pub mod pending;
pub mod state;
pub mod translator;

pub use adapter::{MessageCallback, NativeDebugger, NoopHost, SessionHost};
pub use config::{DomMutationPolicy, TranslatorConfig};
pub use console::{ConsoleCall, ConsoleCallCorrelator};
pub use error::{Error, Result};
pub use state::{DebugOnLoad, DebuggerState};
pub use translator::{AfterResume, ProtocolTranslator};
pub use wvdt_protocol as protocol;
