//! Typed views over the handful of protocol payloads the bridge inspects.
//!
//! Fields the bridge never reads are not modelled; the untyped
//! [`Message`](crate::Message) keeps them on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Execution context id.
pub type ContextId = i64;

/// DOM node id.
pub type NodeId = i64;

/// `Runtime.evaluate` parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
	pub expression: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_group: Option<String>,
	#[serde(default)]
	pub include_command_line_api: bool,
	#[serde(default)]
	pub silent: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context_id: Option<ContextId>,
	#[serde(default)]
	pub return_by_value: bool,
	#[serde(default)]
	pub generate_preview: bool,
	#[serde(default)]
	pub user_gesture: bool,
	#[serde(default)]
	pub await_promise: bool,
}

impl EvaluateParams {
	/// Parameters the bridge uses for its own evaluations in the page.
	pub fn console(expression: impl Into<String>, context_id: Option<ContextId>) -> Self {
		Self {
			expression: expression.into(),
			object_group: Some("console".to_string()),
			include_command_line_api: true,
			silent: false,
			context_id,
			return_by_value: false,
			generate_preview: true,
			user_gesture: true,
			await_promise: false,
		}
	}

	/// True when none of the flags that change evaluation semantics are set.
	pub fn has_standard_flags(&self) -> bool {
		!self.silent && !self.await_promise && !self.return_by_value
	}
}

/// `Debugger.setBreakpointByUrl` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointByUrlParams {
	#[serde(default)]
	pub url: Option<String>,
	pub line_number: i64,
	#[serde(default)]
	pub column_number: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub condition: Option<String>,
}

impl SetBreakpointByUrlParams {
	/// Cache key in `url:line:column` form, `None` for url-less requests.
	pub fn key(&self) -> Option<String> {
		let url = self.url.as_deref().filter(|url| !url.is_empty())?;
		Some(format!(
			"{url}:{}:{}",
			self.line_number,
			self.column_number.unwrap_or(0)
		))
	}
}

/// Script location as reported in pause events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
	pub script_id: String,
	pub line_number: i64,
	#[serde(default)]
	pub column_number: i64,
}

/// One frame of a `Debugger.paused` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
	#[serde(default)]
	pub call_frame_id: Option<String>,
	#[serde(default)]
	pub function_name: String,
	pub location: Location,
}

/// `Debugger.paused` parameters, reduced to what the bridge reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedParams {
	#[serde(default)]
	pub call_frames: Vec<CallFrame>,
	#[serde(default)]
	pub reason: Option<String>,
	#[serde(default)]
	pub data: Option<Value>,
}

impl PausedParams {
	/// Breakpoint id when the pause was caused by a breakpoint hit.
	pub fn breakpoint_id(&self) -> Option<&str> {
		if self.reason.as_deref() != Some("Breakpoint") {
			return None;
		}
		self.data.as_ref()?.get("breakpointId")?.as_str()
	}
}

/// Frame of a console stack trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
	pub function_name: String,
	pub script_id: String,
	pub url: String,
	pub line_number: i64,
	pub column_number: i64,
}

impl From<&CallFrame> for StackFrame {
	fn from(frame: &CallFrame) -> Self {
		Self {
			function_name: frame.function_name.clone(),
			script_id: frame.location.script_id.clone(),
			url: String::new(),
			line_number: frame.location.line_number,
			column_number: frame.location.column_number,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
	pub call_frames: Vec<StackFrame>,
}

impl StackTrace {
	/// Converts pause frames to a console stack, dropping the innermost frame
	/// when there is more than one (it belongs to the logging shim).
	pub fn from_pause(frames: &[CallFrame]) -> Self {
		let skip = usize::from(frames.len() > 1);
		Self {
			call_frames: frames.iter().skip(skip).map(StackFrame::from).collect(),
		}
	}
}

/// `Runtime.executionContextCreated` context description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextDescription {
	pub id: ContextId,
	#[serde(default)]
	pub is_page_context: Option<bool>,
	#[serde(default)]
	pub aux_data: Option<Value>,
}

impl ExecutionContextDescription {
	/// Older engines flag the page context directly, newer ones via `auxData.isDefault`.
	pub fn is_page(&self) -> bool {
		self.is_page_context.unwrap_or(false)
			|| self
				.aux_data
				.as_ref()
				.and_then(|aux| aux.get("isDefault"))
				.and_then(Value::as_bool)
				.unwrap_or(false)
	}
}

/// Remote object description for an exception thrown by an evaluation.
pub fn error_remote_object(class_name: &str, description: &str) -> Value {
	json!({
		"type": "object",
		"subtype": "error",
		"className": class_name,
		"description": description,
	})
}

/// `Runtime.evaluate` result wrapping a thrown exception.
pub fn thrown_evaluate_result(class_name: &str, description: &str) -> Value {
	json!({
		"result": error_remote_object(class_name, description),
		"wasThrown": true,
	})
}
