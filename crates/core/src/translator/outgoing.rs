//! Front-end requests on their way to the engine.

use serde_json::{Value, json};
use tracing::{debug, trace, warn};
use wvdt_protocol::{EvaluateParams, FrameKind, Message, MessageId, SetBreakpointByUrlParams, thrown_evaluate_result};

use super::ProtocolTranslator;
use crate::error::Result;
use crate::pending::PendingKind;
use crate::state::{DebuggerState, PAUSE_PROBE_SCRIPT};

/// What to do with a request after inspection.
enum Outgoing {
	/// Forward under a fresh local id, handling the response as `kind`.
	Forward { kind: PendingKind, probe: Option<&'static str> },
	/// Already answered or intentionally dropped.
	Handled,
}

impl ProtocolTranslator {
	/// Handles one frame from the front-end.
	pub fn handle_frontend_message(&mut self, text: &str) -> Result<()> {
		let mut message = Message::parse(text)?;
		trace!(target = "wvdt.translator", message = %text, "from front-end");

		if !self.is_enabled() {
			debug!(target = "wvdt.translator", method = ?message.method(), "debugger disabled, ignoring front-end request");
			return Ok(());
		}

		let Some(id) = message.id().filter(|_| message.kind() == FrameKind::Request) else {
			self.rewrite_context(&mut message);
			self.send_to_adapter(&message);
			return Ok(());
		};

		let method = message.method().unwrap_or_default().to_string();
		let outgoing = match method.as_str() {
			"Runtime.compileScript" => {
				debug!(target = "wvdt.translator", id, "substituting Runtime.compileScript");
				message = Message::request(id, "Runtime.enable", None);
				Outgoing::Forward {
					kind: PendingKind::CompileScript,
					probe: None,
				}
			}
			"Runtime.evaluate" => self.outgoing_evaluate(id, &message),
			"Debugger.getPossibleBreakpoints" => {
				let locations = match message.params().and_then(|params| params.get("start")) {
					Some(start) => json!([start]),
					None => json!([]),
				};
				self.respond(id, json!({ "locations": locations }));
				Outgoing::Handled
			}
			"Debugger.pause" => {
				self.state = DebuggerState::Paused;
				Outgoing::Forward {
					kind: PendingKind::Forward,
					probe: Some(PAUSE_PROBE_SCRIPT),
				}
			}
			"Debugger.resume" | "Debugger.stepOver" | "Debugger.stepInto" | "Debugger.stepOut" => {
				if let Some(state) = DebuggerState::from_method(&method) {
					self.state = state;
				}
				Outgoing::Forward {
					kind: PendingKind::Forward,
					probe: None,
				}
			}
			"Page.reload" => {
				if self.reload_in_flight {
					debug!(target = "wvdt.translator", id, "reload already in flight");
					self.respond(id, json!({}));
					Outgoing::Handled
				} else {
					self.reload_in_flight = true;
					Outgoing::Forward {
						kind: PendingKind::Forward,
						probe: None,
					}
				}
			}
			"Debugger.setBreakpointByUrl" => self.outgoing_set_breakpoint(id, &message),
			"Debugger.removeBreakpoint" => {
				let kind = match message.param_str("breakpointId") {
					Some(breakpoint_id) if self.breakpoints.contains_id(breakpoint_id) => {
						PendingKind::RemoveBreakpoint {
							breakpoint_id: breakpoint_id.to_string(),
						}
					}
					_ => PendingKind::Forward,
				};
				Outgoing::Forward { kind, probe: None }
			}
			"DOM.getDocument" => Outgoing::Forward {
				kind: PendingKind::GetDocument,
				probe: None,
			},
			"Overlay.setPausedInDebuggerMessage" => {
				self.respond(id, json!({}));
				Outgoing::Handled
			}
			"Overlay.highlightNode" => {
				self.respond(id, json!({}));
				if let Some(node_id) = message.param_i64("nodeId") {
					self.highlight_node(node_id);
				}
				Outgoing::Handled
			}
			"Overlay.hideHighlight" => {
				self.respond(id, json!({}));
				let expression = format!("{}.hideHighlight()", self.config.helper_object);
				self.evaluate_helper(expression);
				Outgoing::Handled
			}
			_ => Outgoing::Forward {
				kind: PendingKind::Forward,
				probe: None,
			},
		};

		if let Outgoing::Forward { kind, probe } = outgoing {
			let local_id = self.pending.forward(id, kind);
			if local_id != id {
				debug!(target = "wvdt.translator", id, local_id, method = %method, "remapped request");
			}
			message.set_id(local_id);
			self.rewrite_context(&mut message);
			self.send_to_adapter(&message);
			if let Some(probe) = probe {
				self.deferred.push_back(probe.to_string());
			}
		}
		Ok(())
	}

	fn outgoing_evaluate(&mut self, id: MessageId, message: &Message) -> Outgoing {
		let params = message
			.params()
			.cloned()
			.and_then(|params| serde_json::from_value::<EvaluateParams>(params).ok());

		if let Some(params) = params {
			let in_page = params
				.context_id
				.is_some_and(|context| self.contexts.is_current(context));
			if in_page && params.has_standard_flags() {
				self.evaluate_directly(id, params);
				return Outgoing::Handled;
			}
		}

		Outgoing::Forward {
			kind: PendingKind::Evaluate,
			probe: None,
		}
	}

	/// Evaluates through the host scripting bridge, then asks the engine to
	/// describe the produced value so the front-end gets a remote object.
	fn evaluate_directly(&mut self, id: MessageId, params: EvaluateParams) {
		let expression = match (&self.config.command_line_api_object, params.include_command_line_api) {
			(Some(api), true) => format!("with ({api}) {{ {} }}", params.expression),
			_ => params.expression,
		};
		let Some(adapter) = self.adapter.as_mut() else {
			return;
		};

		match adapter.evaluate(&expression) {
			Ok(value) => {
				debug!(target = "wvdt.translator", id, "direct evaluate");
				let describe = EvaluateParams::console(value.to_expression(), self.contexts.current());
				let local_id = self.pending.forward(id, PendingKind::Forward);
				let request = Message::request(local_id, "Runtime.evaluate", serde_json::to_value(describe).ok());
				self.send_to_adapter(&request);
			}
			Err(exception) => {
				debug!(target = "wvdt.translator", id, error = %exception, "direct evaluate threw");
				self.respond(
					id,
					thrown_evaluate_result(&exception.class_name, &exception.message),
				);
			}
		}
	}

	fn outgoing_set_breakpoint(&mut self, id: MessageId, message: &Message) -> Outgoing {
		let key = message
			.params()
			.cloned()
			.and_then(|params| serde_json::from_value::<SetBreakpointByUrlParams>(params).ok())
			.and_then(|params| params.key());

		let Some(key) = key else {
			return Outgoing::Forward {
				kind: PendingKind::Forward,
				probe: None,
			};
		};

		if let Some(cached) = self.breakpoints.get(&key) {
			debug!(target = "wvdt.translator", id, key = %key, "breakpoint already set, answering from cache");
			let response = cached.response.clone();
			self.respond(id, response);
			return Outgoing::Handled;
		}

		if self.breakpoints.park(&key, id) {
			debug!(target = "wvdt.translator", id, key = %key, "breakpoint already requested, waiting for its response");
			return Outgoing::Handled;
		}

		self.breakpoints.begin_set(key.clone());
		Outgoing::Forward {
			kind: PendingKind::SetBreakpoint { key },
			probe: None,
		}
	}

	fn highlight_node(&mut self, node_id: i64) {
		let Some(path) = self.dom.path_to(node_id).filter(|path| !path.is_empty()) else {
			debug!(target = "wvdt.translator", node = node_id, "node not in shadow tree, nothing to highlight");
			return;
		};
		if self.dom.resolve(&path) != Some(node_id) {
			warn!(target = "wvdt.translator", node = node_id, ?path, "shadow tree path resolves to a different node");
		}
		let path = Value::from(path);
		let expression = format!("{}.highlightNode({path})", self.config.helper_object);
		self.evaluate_helper(expression);
	}

	/// Invokes the page-side helper; the result is absorbed.
	fn evaluate_helper(&mut self, expression: String) {
		let params = EvaluateParams {
			user_gesture: false,
			generate_preview: false,
			..EvaluateParams::console(expression, self.contexts.current())
		};
		self.send_internal(
			"Runtime.evaluate",
			serde_json::to_value(params).ok(),
			PendingKind::Internal,
		);
	}

	/// Points `contextId`/`executionContextId` at the live page context.
	pub(super) fn rewrite_context(&self, message: &mut Message) {
		let contexts = &self.contexts;
		let Some(params) = message.params_mut() else {
			return;
		};
		for key in ["contextId", "executionContextId"] {
			let Some(id) = params.get(key).and_then(Value::as_i64) else {
				continue;
			};
			let canonical = contexts.canonical(id);
			if canonical != id {
				debug!(target = "wvdt.translator", from = id, to = canonical, "rewriting stale context id");
				params.insert(key.to_string(), Value::from(canonical));
			}
			break;
		}
	}
}
