//! Front-end ⇄ engine message translation.
//!
//! [`ProtocolTranslator`] sits between a DevTools front-end and the engine's
//! [`NativeDebugger`]. It is a synchronous state machine: the owner feeds it
//! front-end frames, engine frames and host signals, then drains
//! [`take_frontend_messages`](ProtocolTranslator::take_frontend_messages) and
//! calls [`run_deferred`](ProtocolTranslator::run_deferred). Engine replies
//! must come back through the owner's queue, never re-entrantly.

mod console_cycle;
mod incoming;
mod outgoing;


use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, trace, warn};
use wvdt_protocol::{CallFrame, ContextId, Message, MessageId};

use crate::adapter::{MessageCallback, NativeDebugger, SessionHost};
use crate::breakpoints::BreakpointCache;
use crate::config::TranslatorConfig;
use crate::console::{ConsoleCall, ConsoleCallCorrelator};
use crate::context::ExecutionContexts;
use crate::dom::ShadowDom;
use crate::error::{Error, Result};
use crate::pending::{PendingKind, PendingRequests};
use crate::state::{DebugOnLoad, DebuggerState, PAUSE_PROBE_SCRIPT};

use self::console_cycle::PauseCycle;

/// Work queued until the engine reports `Debugger.resumed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterResume {
	/// Drop page-scoped state: console queue, DOM tree, translator requests.
	ClearPageState,
	/// Unregister the message callback and disable the native debugger.
	DisableAdapter,
}

pub struct ProtocolTranslator {
	config: TranslatorConfig,
	adapter: Option<Box<dyn NativeDebugger>>,
	host: Arc<dyn SessionHost>,
	state: DebuggerState,
	paused: bool,
	connected: bool,
	shutting_down: bool,
	pending: PendingRequests,
	breakpoints: BreakpointCache,
	dom: ShadowDom,
	contexts: ExecutionContexts,
	console: ConsoleCallCorrelator,
	cycle: Option<PauseCycle>,
	/// Teardown resume held back until in-flight breakpoint sets settle.
	resume_on_settle: bool,
	last_frames: Vec<CallFrame>,
	after_resume: Vec<AfterResume>,
	debug_on_load: DebugOnLoad,
	inject_helper_armed: bool,
	suppress_reload_echo: bool,
	reload_in_flight: bool,
	outbox: VecDeque<String>,
	deferred: VecDeque<String>,
}

impl ProtocolTranslator {
	/// Creates a translator. Without an adapter every operation is a no-op
	/// and [`is_enabled`](Self::is_enabled) stays `false`.
	pub fn new(
		config: TranslatorConfig,
		adapter: Option<Box<dyn NativeDebugger>>,
		host: Arc<dyn SessionHost>,
	) -> Self {
		if adapter.is_none() {
			warn!(target = "wvdt.translator", "no native debugger available, translator disabled");
		}
		Self {
			config,
			adapter,
			host,
			state: DebuggerState::Running,
			paused: false,
			connected: false,
			shutting_down: false,
			pending: PendingRequests::new(),
			breakpoints: BreakpointCache::new(),
			dom: ShadowDom::new(),
			contexts: ExecutionContexts::new(),
			console: ConsoleCallCorrelator::new(),
			cycle: None,
			resume_on_settle: false,
			last_frames: Vec::new(),
			after_resume: Vec::new(),
			debug_on_load: DebugOnLoad::None,
			inject_helper_armed: false,
			suppress_reload_echo: false,
			reload_in_flight: false,
			outbox: VecDeque::new(),
			deferred: VecDeque::new(),
		}
	}

	/// Registers `callback` for engine messages and enables the debugger.
	pub fn start(&mut self, callback: MessageCallback) -> Result<()> {
		let adapter = self.adapter.as_mut().ok_or(Error::AdapterUnavailable)?;
		adapter.set_message_callback(Some(callback));
		adapter.set_enabled(true);
		info!(target = "wvdt.translator", "native debugger enabled");

		if self.config.enable_network_on_start {
			self.send_internal("Network.enable", None, PendingKind::Internal);
		}
		Ok(())
	}

	pub fn config(&self) -> &TranslatorConfig {
		&self.config
	}

	pub fn is_enabled(&self) -> bool {
		self.adapter.as_ref().is_some_and(|adapter| adapter.is_enabled())
	}

	/// Whether the engine last reported `Debugger.paused`.
	pub fn is_paused(&self) -> bool {
		self.paused
	}

	pub fn is_connected(&self) -> bool {
		self.connected
	}

	pub fn is_shutting_down(&self) -> bool {
		self.shutting_down
	}

	pub fn state(&self) -> DebuggerState {
		self.state
	}

	pub fn current_context(&self) -> Option<ContextId> {
		self.contexts.current()
	}

	pub fn debug_on_load(&self) -> DebugOnLoad {
		self.debug_on_load
	}

	pub fn set_debug_on_load(&mut self, mode: DebugOnLoad) {
		self.debug_on_load = mode;
	}

	/// Frames produced since the last call, in order.
	pub fn take_frontend_messages(&mut self) -> Vec<String> {
		self.outbox.drain(..).collect()
	}

	/// Runs queued page evaluations, the step after a pause or resume request.
	pub fn run_deferred(&mut self) {
		while let Some(script) = self.deferred.pop_front() {
			let Some(adapter) = self.adapter.as_mut() else {
				self.deferred.clear();
				return;
			};
			if !adapter.is_enabled() {
				continue;
			}
			if let Err(err) = adapter.evaluate(&script) {
				debug!(target = "wvdt.translator", error = %err, "deferred evaluation threw");
			}
		}
	}

	/// Intercepted console call from the page.
	pub fn console_call(&mut self, call: ConsoleCall) {
		if !self.is_enabled() || self.shutting_down {
			return;
		}
		debug!(
			target = "wvdt.translator",
			kind = call.kind.as_str(),
			args = call.args.len(),
			queued = self.console.len(),
			"console call"
		);
		self.console.push(call);
		self.pump_console();
	}

	pub fn connection_opened(&mut self) {
		self.connected = true;
		self.shutting_down = false;
		self.host.connection_opened();
	}

	/// Front-end went away: drop breakpoints, let the page run and forget
	/// page state once it does.
	pub fn connection_closed(&mut self) {
		self.connected = false;
		if self.is_enabled() {
			self.remove_all_breakpoints();
			self.release(true, vec![AfterResume::ClearPageState]);
		}
		self.host.connection_closed();
	}

	/// The host is about to reload the page itself; suppress the reload echo.
	pub fn page_reloading(&mut self) {
		if !self.is_enabled() {
			return;
		}
		self.suppress_reload_echo = true;
		self.reload_in_flight = true;
	}

	/// Reloads through the debugger unless a reload is already in flight.
	pub fn reload_page(&mut self) {
		if !self.is_enabled() || self.reload_in_flight {
			return;
		}
		self.reload_in_flight = true;
		self.suppress_reload_echo = false;
		self.send_internal(
			"Page.reload",
			Some(json!({ "ignoreCache": false })),
			PendingKind::Internal,
		);
	}

	/// Reloads with an optional break. Without a connected front-end, or with
	/// [`DebugOnLoad::None`], the page reloads through the host instead.
	pub fn reload_with(&mut self, mode: DebugOnLoad) {
		if mode != DebugOnLoad::None && self.is_enabled() && self.connected {
			self.debug_on_load = mode;
			self.reload_page();
		} else if let Some(adapter) = self.adapter.as_mut() {
			adapter.reload();
		}
	}

	pub fn page_load_complete(&mut self) {
		self.reload_in_flight = false;
	}

	/// Breaks into the debugger at the next statement.
	pub fn debug_break(&mut self) {
		if !self.is_enabled() || self.shutting_down {
			return;
		}
		self.break_now(Some(PAUSE_PROBE_SCRIPT));
	}

	fn break_now(&mut self, probe: Option<&str>) {
		self.state = DebuggerState::Paused;
		self.send_internal("Debugger.pause", None, PendingKind::Internal);
		if let Some(probe) = probe {
			self.deferred.push_back(probe.to_string());
		}
	}

	/// Sends `Debugger.removeBreakpoint` for every cached breakpoint.
	pub fn remove_all_breakpoints(&mut self) {
		if !self.is_enabled() {
			return;
		}
		for breakpoint_id in self.breakpoints.drain_ids() {
			debug!(target = "wvdt.translator", breakpoint = %breakpoint_id, "removing breakpoint");
			self.send_internal(
				"Debugger.removeBreakpoint",
				Some(json!({ "breakpointId": breakpoint_id })),
				PendingKind::Internal,
			);
		}
	}

	/// Lets a paused engine run again and performs `then` once it has.
	///
	/// Work requested while an earlier release is still pending runs after
	/// that earlier work. When shutting down, the resume waits until every
	/// unanswered `Debugger.setBreakpointByUrl` has been answered and removed.
	pub fn release(&mut self, shutting_down: bool, then: Vec<AfterResume>) {
		self.shutting_down = shutting_down;
		if self.paused && self.is_enabled() {
			self.after_resume.extend(then);
			if self.shutting_down && self.breakpoints.has_in_flight() {
				debug!(target = "wvdt.translator", "resume waits for unanswered breakpoint requests");
				self.resume_on_settle = true;
			} else if !self.resume_on_settle {
				self.send_resume();
			}
		} else {
			for step in then {
				self.run_after_resume(step);
			}
		}
	}

	fn send_resume(&mut self) {
		self.send_internal(DebuggerState::Running.method(), None, PendingKind::Internal);
		self.deferred.push_back(PAUSE_PROBE_SCRIPT.to_string());
	}

	/// Sends the held-back resume once no breakpoint request is unanswered.
	fn resume_if_settled(&mut self) {
		if !self.resume_on_settle || self.breakpoints.has_in_flight() {
			return;
		}
		self.resume_on_settle = false;
		if self.paused {
			self.send_resume();
		}
	}

	/// Starts teardown: breakpoints, then resume, then disable.
	///
	/// Returns `true` while the disable waits for `Debugger.resumed`.
	pub fn begin_teardown(&mut self) -> bool {
		self.remove_all_breakpoints();
		self.release(true, vec![AfterResume::DisableAdapter]);
		self.teardown_pending()
	}

	pub fn teardown_pending(&self) -> bool {
		self.after_resume.contains(&AfterResume::DisableAdapter)
	}

	/// Disables the adapter without waiting for the engine to resume.
	pub fn force_disable(&mut self) {
		self.resume_on_settle = false;
		self.after_resume.clear();
		self.run_after_resume(AfterResume::DisableAdapter);
	}

	fn run_after_resume(&mut self, step: AfterResume) {
		match step {
			AfterResume::ClearPageState => self.reset_page(),
			AfterResume::DisableAdapter => {
				if let Some(adapter) = self.adapter.as_mut() {
					adapter.set_message_callback(None);
					adapter.set_enabled(false);
					info!(target = "wvdt.translator", "native debugger disabled");
				}
			}
		}
	}

	/// Forgets everything tied to the current page.
	fn reset_page(&mut self) {
		self.console.clear();
		self.cycle = None;
		self.dom.clear();
		self.pending.reset_page();
	}

	fn emit(&mut self, message: Message) {
		let text = message.to_string();
		trace!(target = "wvdt.translator", message = %text, "to front-end");
		self.outbox.push_back(text);
	}

	fn respond(&mut self, id: MessageId, result: Value) {
		self.emit(Message::response(id, result));
	}

	fn send_to_adapter(&mut self, message: &Message) {
		let Some(adapter) = self.adapter.as_mut() else {
			return;
		};
		if !adapter.is_enabled() {
			debug!(target = "wvdt.translator", method = ?message.method(), "debugger disabled, dropping request");
			return;
		}
		let text = message.to_string();
		trace!(target = "wvdt.translator", message = %text, "to engine");
		adapter.send_message(&text);
	}

	fn send_internal(&mut self, method: &str, params: Option<Value>, kind: PendingKind) -> MessageId {
		let id = self.pending.internal(kind);
		self.send_to_adapter(&Message::request(id, method, params));
		id
	}
}
