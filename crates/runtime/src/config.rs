//! Server configuration.

use serde::{Deserialize, Serialize};
use wvdt::TranslatorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	/// Bind address, also used in debug URLs.
	pub host: String,
	/// Upper bound for a graceful listener shutdown and for the wait on
	/// `Debugger.resumed` while a session stops.
	pub stop_timeout_ms: u64,
	pub translator: TranslatorConfig,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			stop_timeout_ms: 1000,
			translator: TranslatorConfig::default(),
		}
	}
}

impl ServerConfig {
	pub fn stop_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_millis(self.stop_timeout_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_partial_config_keeps_defaults() {
		let config: ServerConfig = serde_json::from_str(
			r#"{"stop_timeout_ms": 250, "translator": {"dom_mutation_policy": "reject"}}"#,
		)
		.unwrap();

		assert_eq!(config.host, "localhost");
		assert_eq!(config.stop_timeout().as_millis(), 250);
		assert_eq!(config.translator.dom_mutation_policy, wvdt::DomMutationPolicy::Reject);
		assert_eq!(config.translator.helper_object, "devtoolsHelper");
	}
}
