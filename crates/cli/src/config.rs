//! CLI defaults loaded from a JSON file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use wvdt_protocol::ResourcePath;

use crate::cli::TargetArgs;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
	pub port: Option<u16>,
	pub host: String,
	pub timeout_ms: u64,
}

impl Default for CliConfig {
	fn default() -> Self {
		Self {
			port: None,
			host: "localhost".to_string(),
			timeout_ms: 5000,
		}
	}
}

/// `<config dir>/wvdt/config.json`.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("wvdt").join("config.json"))
}

impl CliConfig {
	/// Loads `explicit`, or the default file when it exists.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		let path = match explicit {
			Some(path) => path.to_path_buf(),
			None => match default_path() {
				Some(path) if path.is_file() => path,
				_ => return Ok(Self::default()),
			},
		};
		let raw = std::fs::read_to_string(&path)
			.with_context(|| format!("Failed to read config file {}", path.display()))?;
		serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
	}

	/// Flags win over file values.
	pub fn resolve(&self, args: &TargetArgs) -> Result<Target> {
		let Some(port) = args.port.or(self.port) else {
			bail!("No port given: pass --port or set \"port\" in the config file");
		};
		Ok(Target {
			host: args.host.clone().unwrap_or_else(|| self.host.clone()),
			port,
			resource: ResourcePath::for_instance(args.instance),
		})
	}
}

/// A session address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	pub host: String,
	pub port: u16,
	pub resource: ResourcePath,
}

impl Target {
	pub fn debug_url(&self) -> String {
		self.resource.debug_url(&self.host, self.port)
	}

	pub fn websocket_url(&self) -> String {
		self.resource.websocket_url(&self.host, self.port)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	fn args(port: Option<u16>, instance: u32) -> TargetArgs {
		TargetArgs {
			port,
			host: None,
			instance,
		}
	}

	#[test]
	fn test_load_partial_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"port": 51234}}"#).unwrap();

		let config = CliConfig::load(Some(file.path())).unwrap();

		assert_eq!(config.port, Some(51234));
		assert_eq!(config.host, "localhost");
		assert_eq!(config.timeout_ms, 5000);
	}

	#[test]
	fn test_load_missing_explicit_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let err = CliConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
		assert!(err.to_string().contains("nope.json"));
	}

	#[test]
	fn test_flags_override_file() {
		let config = CliConfig {
			port: Some(9000),
			..CliConfig::default()
		};

		let target = config.resolve(&args(Some(51234), 3)).unwrap();
		assert_eq!(target.port, 51234);
		assert_eq!(target.websocket_url(), "ws://localhost:51234/?3");
		assert_eq!(
			target.debug_url(),
			"devtools://devtools/bundled/inspector.html?ws=localhost:51234/?3"
		);

		let target = config.resolve(&args(None, 0)).unwrap();
		assert_eq!(target.port, 9000);
		assert_eq!(target.websocket_url(), "ws://localhost:9000/");
	}

	#[test]
	fn test_port_is_required() {
		assert!(CliConfig::default().resolve(&args(None, 0)).is_err());
	}
}
