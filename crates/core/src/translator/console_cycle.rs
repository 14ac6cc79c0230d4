//! Pause, evaluate, resume: turning console calls into `Runtime.consoleAPICalled`.
//!
//! The engine only describes values while paused, so each batch of queued
//! calls runs inside one synthetic pause. Arguments are evaluated one at a
//! time; each response drives the next step. Nothing here blocks.

use serde_json::{Value, json};
use tracing::debug;
use wvdt_protocol::{CallFrame, EvaluateParams, Message, ScriptException, error_remote_object};

use super::ProtocolTranslator;
use crate::pending::PendingKind;
use crate::state::PAUSE_PROBE_SCRIPT;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum PauseCycle {
	/// `Debugger.pause` sent; the matching `Debugger.paused` is swallowed.
	AwaitingPause,
	/// Paused, evaluating arguments of the call at the queue front.
	Resolving {
		frames: Vec<CallFrame>,
		/// `false` when the engine was already paused by the user.
		resume: bool,
	},
	/// Resume sent; the matching `Debugger.resumed` is swallowed.
	Resuming,
}

impl ProtocolTranslator {
	/// Starts a cycle when one can start: nothing in flight, no front-end
	/// evaluate outstanding and calls waiting.
	pub(super) fn pump_console(&mut self) {
		if self.cycle.is_some()
			|| self.pending.awaiting_evaluate()
			|| self.console.is_empty()
			|| !self.is_enabled()
		{
			return;
		}

		if self.paused {
			debug!(target = "wvdt.translator", "engine already paused, resolving console call in place");
			self.cycle = Some(PauseCycle::Resolving {
				frames: self.last_frames.clone(),
				resume: false,
			});
			self.resolve_console_args();
			return;
		}

		debug!(target = "wvdt.translator", queued = self.console.len(), "pausing for console call");
		self.cycle = Some(PauseCycle::AwaitingPause);
		self.send_internal("Debugger.pause", None, PendingKind::PauseAck);
		self.deferred.push_back(PAUSE_PROBE_SCRIPT.to_string());
	}

	/// Evaluates the next unresolved argument, or emits finished calls.
	pub(super) fn resolve_console_args(&mut self) {
		loop {
			let context = self.contexts.current();
			let Some(call) = self.console.front() else {
				self.finish_cycle();
				return;
			};

			if let Some((index, value)) = call.next_unresolved() {
				let params = EvaluateParams::console(value.to_expression(), context);
				self.send_internal(
					"Runtime.evaluate",
					serde_json::to_value(params).ok(),
					PendingKind::ConsoleArg { index },
				);
				return;
			}

			let Some(call) = self.console.pop() else {
				continue;
			};
			let frames = match &self.cycle {
				Some(PauseCycle::Resolving { frames, .. }) => frames.clone(),
				_ => self.last_frames.clone(),
			};
			self.emit(call.into_event(context, &frames));

			if self.pending.awaiting_evaluate() || self.console.is_empty() {
				self.finish_cycle();
				return;
			}
		}
	}

	pub(super) fn console_arg_resolved(&mut self, index: usize, response: &Message) {
		let remote_object = remote_object_from(response);
		match self.console.front_mut() {
			Some(call) => call.resolve_arg(index, remote_object),
			None => return,
		}
		self.resolve_console_args();
	}

	/// Returns the engine to the state it was in before the cycle.
	fn finish_cycle(&mut self) {
		match self.cycle.take() {
			Some(PauseCycle::Resolving { resume: true, .. }) => {
				let method = self.state.resume_method();
				debug!(target = "wvdt.translator", method, "console calls emitted, resuming");
				self.cycle = Some(PauseCycle::Resuming);
				self.send_internal(method, None, PendingKind::Internal);
				self.deferred.push_back(self.state.resume_probe().to_string());
			}
			Some(PauseCycle::Resolving { resume: false, .. }) | None => {}
			Some(other) => self.cycle = Some(other),
		}
	}
}

/// Remote object describing one evaluated argument. Thrown exceptions
/// become error objects.
fn remote_object_from(response: &Message) -> Value {
	if let Some(error) = response.error() {
		let text = error
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("Evaluation failed");
		let exception = ScriptException::from_message(text);
		return error_remote_object(&exception.class_name, &exception.message);
	}

	let result = response
		.pointer("result.result")
		.cloned()
		.unwrap_or_else(|| json!({ "type": "undefined" }));
	let thrown = response
		.pointer("result.wasThrown")
		.and_then(Value::as_bool)
		.unwrap_or(false);
	if !thrown {
		return result;
	}

	let description = result
		.get("description")
		.and_then(Value::as_str)
		.unwrap_or("Error");
	let exception = ScriptException::from_message(description);
	let class_name = result
		.get("className")
		.and_then(Value::as_str)
		.unwrap_or(&exception.class_name);
	error_remote_object(class_name, &exception.message)
}
