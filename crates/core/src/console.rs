//! Console calls awaiting argument resolution.

use std::collections::VecDeque;

use serde_json::{Value, json};
use wvdt_protocol::{CallFrame, ConsoleApiType, ContextId, Message, ScriptValue, StackTrace};

/// A console call intercepted in the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleCall {
	pub kind: ConsoleApiType,
	pub args: Vec<ScriptValue>,
	/// Milliseconds since the Unix epoch at the time of the call.
	pub timestamp_ms: f64,
	resolved: Vec<Option<Value>>,
}

impl ConsoleCall {
	pub fn new(kind: ConsoleApiType, args: Vec<ScriptValue>, timestamp_ms: f64) -> Self {
		let resolved = vec![None; args.len()];
		Self {
			kind,
			args,
			timestamp_ms,
			resolved,
		}
	}

	/// First argument without a remote object yet.
	pub fn next_unresolved(&self) -> Option<(usize, &ScriptValue)> {
		self.resolved
			.iter()
			.position(Option::is_none)
			.map(|index| (index, &self.args[index]))
	}

	pub fn resolve_arg(&mut self, index: usize, remote_object: Value) {
		if let Some(slot) = self.resolved.get_mut(index) {
			*slot = Some(remote_object);
		}
	}

	/// Builds the `Runtime.consoleAPICalled` event for this call.
	pub fn into_event(self, context_id: Option<ContextId>, frames: &[CallFrame]) -> Message {
		let args: Vec<Value> = self
			.resolved
			.into_iter()
			.map(|value| value.unwrap_or_else(|| json!({ "type": "undefined" })))
			.collect();
		Message::event(
			"Runtime.consoleAPICalled",
			json!({
				"type": self.kind,
				"args": args,
				"executionContextId": context_id.unwrap_or_default(),
				"timestamp": self.timestamp_ms,
				"stackTrace": StackTrace::from_pause(frames),
			}),
		)
	}
}

/// FIFO of console calls. Calls leave the queue in arrival order only.
#[derive(Debug, Default)]
pub struct ConsoleCallCorrelator {
	queue: VecDeque<ConsoleCall>,
}

impl ConsoleCallCorrelator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, call: ConsoleCall) {
		self.queue.push_back(call);
	}

	pub fn front(&self) -> Option<&ConsoleCall> {
		self.queue.front()
	}

	pub fn front_mut(&mut self) -> Option<&mut ConsoleCall> {
		self.queue.front_mut()
	}

	pub fn pop(&mut self) -> Option<ConsoleCall> {
		self.queue.pop_front()
	}

	pub fn clear(&mut self) {
		self.queue.clear();
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}
