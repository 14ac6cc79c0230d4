//! Runtime for `wvdt` debug sessions.
//!
//! A [`SessionRegistry`] hands out one session per `(port, instance)` pair.
//! Sessions on the same port share a [`Multiplexer`]: a single WebSocket
//! listener that routes `/` (instance `0`) and `/?<instance>` to the right
//! session. Each session runs its translator on its own task.
//!
//! ```ignore
//! let registry = SessionRegistry::new(ServerConfig::default());
//! let session = registry.start_session(51234, 0, Some(adapter), host).await?;
//! println!("{}", session.debug_url());
//! registry.stop_session(&session).await?;
//! ```

pub mod config;
pub mod error;
pub mod mux;
pub mod registry;
pub mod session;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use mux::Multiplexer;
pub use registry::{SessionRegistry, StopOutcome};
pub use session::{SessionHandle, SessionStatus};
