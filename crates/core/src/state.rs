use serde::{Deserialize, Serialize};

/// Script evaluated right after `Debugger.pause` so the engine has a
/// statement to stop on.
pub const PAUSE_PROBE_SCRIPT: &str = "// injected eval to pause immediately";

/// Script evaluated after a step request so the step lands in page code.
pub const STEP_PROBE_SCRIPT: &str = "\"\";";

/// Execution state requested by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebuggerState {
	#[default]
	Running,
	Paused,
	StepOver,
	StepInto,
	StepOut,
}

impl DebuggerState {
	pub fn method(self) -> &'static str {
		match self {
			Self::Running => "Debugger.resume",
			Self::Paused => "Debugger.pause",
			Self::StepOver => "Debugger.stepOver",
			Self::StepInto => "Debugger.stepInto",
			Self::StepOut => "Debugger.stepOut",
		}
	}

	pub fn from_method(method: &str) -> Option<Self> {
		match method {
			"Debugger.resume" => Some(Self::Running),
			"Debugger.pause" => Some(Self::Paused),
			"Debugger.stepOver" => Some(Self::StepOver),
			"Debugger.stepInto" => Some(Self::StepInto),
			"Debugger.stepOut" => Some(Self::StepOut),
			_ => None,
		}
	}

	/// Method that hands control back after a synthetic pause.
	///
	/// A front-end pause has no request of its own to return to, so it steps
	/// over and lets the engine stop on the next statement.
	pub fn resume_method(self) -> &'static str {
		match self {
			Self::Paused => Self::StepOver.method(),
			other => other.method(),
		}
	}

	/// Probe evaluated after [`resume_method`](Self::resume_method).
	pub fn resume_probe(self) -> &'static str {
		match self {
			Self::Running => PAUSE_PROBE_SCRIPT,
			_ => STEP_PROBE_SCRIPT,
		}
	}
}

/// Where to break after the next page reload.
///
/// One-shot: the translator resets it to [`None`](DebugOnLoad::None) once used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugOnLoad {
	#[default]
	None,
	/// Pause right before the helper script is injected.
	OnInjectHelper,
	/// Pause once the helper injection completes and the host bridge reconnects.
	OnBridgeConnect,
}
