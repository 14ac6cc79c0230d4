//! Engine messages on their way to the front-end.

use serde_json::{Value, json};
use tracing::{debug, info, trace, warn};
use wvdt_protocol::{EvaluateParams, ExecutionContextDescription, FrameKind, Message, PausedParams};

use super::ProtocolTranslator;
use super::console_cycle::PauseCycle;
use crate::config::DomMutationPolicy;
use crate::dom::DomError;
use crate::error::{Error, Result};
use crate::pending::PendingKind;
use crate::state::{DebugOnLoad, DebuggerState, PAUSE_PROBE_SCRIPT};

impl ProtocolTranslator {
	/// Handles one frame emitted by the engine.
	pub fn handle_adapter_message(&mut self, text: &str) -> Result<()> {
		let message = Message::parse(text)?;
		trace!(target = "wvdt.translator", message = %text, "from engine");

		match message.kind() {
			FrameKind::Response => self.handle_response(message),
			FrameKind::Event => self.handle_event(message)?,
			FrameKind::Request | FrameKind::Unknown => self.emit(message),
		}
		Ok(())
	}

	fn handle_event(&mut self, message: Message) -> Result<()> {
		match message.method().unwrap_or_default() {
			"Runtime.executionContextCreated" => self.on_context_created(&message),
			"Debugger.paused" => {
				if !self.on_paused(&message) {
					return Ok(());
				}
			}
			"Debugger.resumed" => {
				if !self.on_resumed() {
					return Ok(());
				}
			}
			"Debugger.globalObjectCleared" => {
				debug!(target = "wvdt.translator", "global object cleared, resetting page state");
				self.state = DebuggerState::Running;
				self.reset_page();
				self.inject_helper_armed = true;
			}
			"DOM.setChildNodes" | "DOM.childNodeInserted" | "DOM.childNodeRemoved" => {
				self.on_dom_mutation(&message)?;
			}
			_ => {}
		}
		self.emit(message);
		Ok(())
	}

	fn on_context_created(&mut self, message: &Message) {
		let Some(context) = message
			.pointer("params.context")
			.cloned()
			.and_then(|value| serde_json::from_value::<ExecutionContextDescription>(value).ok())
		else {
			return;
		};
		if !context.is_page() {
			return;
		}

		debug!(target = "wvdt.translator", context = context.id, previous = ?self.contexts.current(), "page context created");
		self.contexts.page_context_created(context.id);

		if std::mem::take(&mut self.inject_helper_armed) {
			self.inject_helper(context.id);
		}
	}

	fn inject_helper(&mut self, context_id: i64) {
		if self.debug_on_load == DebugOnLoad::OnInjectHelper {
			self.debug_on_load = DebugOnLoad::None;
			info!(target = "wvdt.translator", "breaking before helper injection");
			self.break_now(None);
		}

		let Some(script) = self.host.helper_script() else {
			self.helper_injected();
			return;
		};
		let params = EvaluateParams {
			object_group: Some(self.config.helper_object_group.clone()),
			..EvaluateParams::console(script, Some(context_id))
		};
		debug!(target = "wvdt.translator", context = context_id, "injecting helper script");
		self.send_internal(
			"Runtime.evaluate",
			serde_json::to_value(params).ok(),
			PendingKind::InjectHelper,
		);
	}

	fn helper_injected(&mut self) {
		if std::mem::take(&mut self.suppress_reload_echo) {
			return;
		}
		if self.debug_on_load == DebugOnLoad::OnBridgeConnect {
			self.debug_on_load = DebugOnLoad::None;
			info!(target = "wvdt.translator", "breaking after helper injection");
			self.break_now(None);
		}
		self.host.page_reload_started();
	}

	/// Returns whether the event reaches the front-end.
	fn on_paused(&mut self, message: &Message) -> bool {
		let params: PausedParams = message
			.params()
			.cloned()
			.and_then(|value| serde_json::from_value(value).ok())
			.unwrap_or_default();
		self.paused = true;
		self.last_frames = params.call_frames.clone();

		if matches!(self.cycle, Some(PauseCycle::AwaitingPause)) {
			debug!(target = "wvdt.translator", "console pause reached");
			self.cycle = Some(PauseCycle::Resolving {
				frames: params.call_frames,
				resume: true,
			});
			self.resolve_console_args();
			return false;
		}

		if self.shutting_down {
			if let Some(breakpoint_id) = params.breakpoint_id() {
				info!(target = "wvdt.translator", breakpoint = %breakpoint_id, "removing leftover breakpoint");
				self.breakpoints.remove_by_id(breakpoint_id);
				self.send_internal(
					"Debugger.removeBreakpoint",
					Some(json!({ "breakpointId": breakpoint_id })),
					PendingKind::Internal,
				);
			}
			debug!(target = "wvdt.translator", "paused while shutting down, resuming");
			self.send_internal(DebuggerState::Running.method(), None, PendingKind::Internal);
			self.deferred.push_back(PAUSE_PROBE_SCRIPT.to_string());
			return false;
		}
		true
	}

	/// Returns whether the event reaches the front-end.
	fn on_resumed(&mut self) -> bool {
		self.paused = false;
		self.resume_on_settle = false;
		let forward = if matches!(self.cycle, Some(PauseCycle::Resuming)) {
			self.cycle = None;
			false
		} else {
			true
		};

		for step in std::mem::take(&mut self.after_resume) {
			self.run_after_resume(step);
		}
		self.pump_console();
		forward
	}

	fn on_dom_mutation(&mut self, message: &Message) -> Result<()> {
		let method = message.method().unwrap_or_default();
		let applied = match method {
			"DOM.setChildNodes" => {
				match (
					message.param_i64("parentId"),
					message.pointer("params.nodes").and_then(Value::as_array),
				) {
					(Some(parent), Some(nodes)) => self.dom.set_child_nodes(parent, nodes),
					_ => Err(DomError::MissingNodeId),
				}
			}
			"DOM.childNodeInserted" => {
				match (
					message.param_i64("parentNodeId"),
					message.pointer("params.node"),
				) {
					(Some(parent), Some(node)) => {
						let previous = message.param_i64("previousNodeId").unwrap_or(0);
						self.dom.insert_child(parent, previous, node)
					}
					_ => Err(DomError::MissingNodeId),
				}
			}
			_ => match (message.param_i64("parentNodeId"), message.param_i64("nodeId")) {
				(Some(parent), Some(node)) => self.dom.remove_child(parent, node),
				_ => Err(DomError::MissingNodeId),
			},
		};

		let Err(err) = applied else {
			return Ok(());
		};
		match self.config.dom_mutation_policy {
			DomMutationPolicy::Skip => {
				warn!(target = "wvdt.translator", method, error = %err, "skipping DOM notification");
				Ok(())
			}
			DomMutationPolicy::Reject => Err(Error::MalformedDomNotification {
				method: method.to_string(),
				reason: err.to_string(),
			}),
		}
	}

	fn handle_response(&mut self, mut message: Message) {
		let Some(local_id) = message.id() else {
			self.emit(message);
			return;
		};
		let Some(pending) = self.pending.take(local_id) else {
			trace!(target = "wvdt.translator", id = local_id, "unmapped response, passing through");
			self.emit(message);
			return;
		};

		let mut after_forward = false;
		let mut repeats = Vec::new();
		match pending.kind {
			PendingKind::Forward | PendingKind::CompileScript => {}
			PendingKind::Evaluate => after_forward = true,
			PendingKind::SetBreakpoint { key } => {
				repeats = self.breakpoints.settle(&key);
				self.breakpoint_set(key, &message);
				self.resume_if_settled();
			}
			PendingKind::RemoveBreakpoint { breakpoint_id } => {
				if message.error().is_none() {
					self.breakpoints.remove_by_id(&breakpoint_id);
				}
			}
			PendingKind::GetDocument => {
				if let Some(root) = message.pointer("result.root") {
					if let Err(err) = self.dom.set_document(root) {
						warn!(target = "wvdt.translator", error = %err, "could not seed shadow tree");
					}
				}
			}
			PendingKind::ConsoleArg { index } => {
				self.console_arg_resolved(index, &message);
				return;
			}
			PendingKind::InjectHelper => {
				self.helper_injected();
				return;
			}
			PendingKind::PauseAck | PendingKind::Internal => {
				trace!(target = "wvdt.translator", id = local_id, "absorbed response");
				return;
			}
		}

		let Some(original_id) = pending.original_id else {
			return;
		};
		message.set_id(original_id);
		let copies: Vec<Message> = repeats
			.into_iter()
			.map(|id| {
				let mut copy = message.clone();
				copy.set_id(id);
				copy
			})
			.collect();
		self.emit(message);
		for copy in copies {
			self.emit(copy);
		}
		if after_forward {
			self.pump_console();
		}
	}

	/// Caches an accepted breakpoint. While shutting down it is removed
	/// right away instead.
	fn breakpoint_set(&mut self, key: String, message: &Message) {
		let breakpoint_id = message
			.pointer("result.breakpointId")
			.and_then(Value::as_str)
			.map(str::to_string);

		if self.shutting_down {
			if let Some(breakpoint_id) = breakpoint_id {
				info!(target = "wvdt.translator", breakpoint = %breakpoint_id, "breakpoint set during shutdown, removing");
				self.send_internal(
					"Debugger.removeBreakpoint",
					Some(json!({ "breakpointId": breakpoint_id })),
					PendingKind::Internal,
				);
			}
			return;
		}

		if let (Some(breakpoint_id), Some(result)) = (breakpoint_id, message.result()) {
			debug!(target = "wvdt.translator", key = %key, breakpoint = %breakpoint_id, "caching breakpoint");
			self.breakpoints.insert(key, breakpoint_id, result.clone());
		}
	}
}
