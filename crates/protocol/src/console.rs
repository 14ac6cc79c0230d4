//! Console API call types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// `Runtime.consoleAPICalled` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ConsoleApiType {
	#[default]
	Log,
	Debug,
	Info,
	Error,
	Warning,
	Dir,
	Dirxml,
	Table,
	Trace,
	Clear,
	StartGroup,
	StartGroupCollapsed,
	EndGroup,
	Assert,
	Profile,
	ProfileEnd,
	Count,
	TimeEnd,
}

impl ConsoleApiType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Log => "log",
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Error => "error",
			Self::Warning => "warning",
			Self::Dir => "dir",
			Self::Dirxml => "dirxml",
			Self::Table => "table",
			Self::Trace => "trace",
			Self::Clear => "clear",
			Self::StartGroup => "startGroup",
			Self::StartGroupCollapsed => "startGroupCollapsed",
			Self::EndGroup => "endGroup",
			Self::Assert => "assert",
			Self::Profile => "profile",
			Self::ProfileEnd => "profileEnd",
			Self::Count => "count",
			Self::TimeEnd => "timeEnd",
		}
	}
}

impl FromStr for ConsoleApiType {
	type Err = std::convert::Infallible;

	/// Accepts both protocol names and the `console.*` function names a page
	/// shim reports (`warn`, `group`, `groupEnd`, ...). Unknown names log.
	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Ok(match name {
			"debug" => Self::Debug,
			"info" => Self::Info,
			"error" => Self::Error,
			"warn" | "warning" => Self::Warning,
			"dir" => Self::Dir,
			"dirxml" => Self::Dirxml,
			"table" => Self::Table,
			"trace" => Self::Trace,
			"clear" => Self::Clear,
			"group" | "startGroup" => Self::StartGroup,
			"groupCollapsed" | "startGroupCollapsed" => Self::StartGroupCollapsed,
			"groupEnd" | "endGroup" => Self::EndGroup,
			"assert" => Self::Assert,
			"profile" => Self::Profile,
			"profileEnd" => Self::ProfileEnd,
			"count" => Self::Count,
			"timeEnd" => Self::TimeEnd,
			_ => Self::Log,
		})
	}
}
