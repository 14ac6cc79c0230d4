//! Requests forwarded to the engine that still await a response.

use std::collections::HashMap;

use wvdt_protocol::MessageId;

/// How to treat the response to a forwarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingKind {
	/// Restore the front-end id and forward.
	Forward,
	/// `Runtime.compileScript` substituted by `Runtime.enable`.
	CompileScript,
	/// Front-end `Runtime.evaluate`; console calls wait for it.
	Evaluate,
	SetBreakpoint { key: String },
	RemoveBreakpoint { breakpoint_id: String },
	/// `DOM.getDocument`; the result seeds the shadow tree.
	GetDocument,
	/// Evaluation of one console call argument.
	ConsoleArg { index: usize },
	/// `Debugger.pause` issued for a console cycle.
	PauseAck,
	/// Issued by the translator itself; the response is absorbed.
	Internal,
	/// Helper script injection into a fresh page context.
	InjectHelper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
	/// Id the front-end used, `None` for translator-issued requests.
	pub original_id: Option<MessageId>,
	pub kind: PendingKind,
}

/// Local id allocator and pending table.
#[derive(Debug)]
pub struct PendingRequests {
	next_id: MessageId,
	entries: HashMap<MessageId, PendingRequest>,
}

impl Default for PendingRequests {
	fn default() -> Self {
		Self {
			next_id: 1,
			entries: HashMap::new(),
		}
	}
}

impl PendingRequests {
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocates a local id for a front-end request.
	pub fn forward(&mut self, original_id: MessageId, kind: PendingKind) -> MessageId {
		self.track(Some(original_id), kind)
	}

	/// Allocates a local id for a request the translator issues on its own.
	pub fn internal(&mut self, kind: PendingKind) -> MessageId {
		self.track(None, kind)
	}

	fn track(&mut self, original_id: Option<MessageId>, kind: PendingKind) -> MessageId {
		let id = self.next_id;
		self.next_id += 1;
		self.entries.insert(id, PendingRequest { original_id, kind });
		id
	}

	/// Consumes the entry for `local_id`.
	pub fn take(&mut self, local_id: MessageId) -> Option<PendingRequest> {
		self.entries.remove(&local_id)
	}

	/// Whether a front-end `Runtime.evaluate` is still unanswered.
	pub fn awaiting_evaluate(&self) -> bool {
		self.entries
			.values()
			.any(|entry| entry.kind == PendingKind::Evaluate)
	}

	/// Forgets page-scoped bookkeeping after a navigation.
	///
	/// Late responses to translator requests are absorbed; front-end requests
	/// still get their ids restored.
	pub fn reset_page(&mut self) {
		for entry in self.entries.values_mut() {
			entry.kind = match &entry.kind {
				PendingKind::ConsoleArg { .. } | PendingKind::PauseAck | PendingKind::InjectHelper => {
					PendingKind::Internal
				}
				PendingKind::Evaluate | PendingKind::GetDocument | PendingKind::CompileScript => {
					PendingKind::Forward
				}
				other => other.clone(),
			};
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ids_are_sequential_and_single_use() {
		let mut pending = PendingRequests::new();

		let first = pending.forward(40, PendingKind::Forward);
		let second = pending.internal(PendingKind::Internal);

		assert_eq!((first, second), (1, 2));
		assert_eq!(pending.take(first).unwrap().original_id, Some(40));
		assert!(pending.take(first).is_none());
		assert_eq!(pending.len(), 1);
	}

	#[test]
	fn test_awaiting_evaluate_until_last_one_answered() {
		let mut pending = PendingRequests::new();
		let first = pending.forward(10, PendingKind::Evaluate);
		let second = pending.forward(11, PendingKind::Evaluate);
		pending.forward(12, PendingKind::Forward);

		pending.take(first);
		assert!(pending.awaiting_evaluate());
		pending.take(second);
		assert!(!pending.awaiting_evaluate());
	}

	#[test]
	fn test_reset_page_demotes_page_scoped_kinds() {
		let mut pending = PendingRequests::new();
		let arg = pending.internal(PendingKind::ConsoleArg { index: 0 });
		let eval = pending.forward(5, PendingKind::Evaluate);
		let bp = pending.forward(6, PendingKind::RemoveBreakpoint {
			breakpoint_id: "1".into(),
		});

		pending.reset_page();

		assert!(!pending.awaiting_evaluate());
		assert_eq!(pending.take(arg).unwrap().kind, PendingKind::Internal);
		assert_eq!(pending.take(eval).unwrap().kind, PendingKind::Forward);
		assert_eq!(
			pending.take(bp).unwrap().kind,
			PendingKind::RemoveBreakpoint {
				breakpoint_id: "1".into()
			}
		);
		assert!(pending.is_empty());
	}
}
