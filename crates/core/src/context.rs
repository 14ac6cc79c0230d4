use std::collections::HashSet;

use wvdt_protocol::ContextId;

/// Tracks the live page execution context across reloads.
///
/// Ids of earlier page contexts are kept for the whole session: a front-end
/// may refer to them long after the page navigated.
#[derive(Debug, Default)]
pub struct ExecutionContexts {
	current: Option<ContextId>,
	superseded: HashSet<ContextId>,
}

impl ExecutionContexts {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn page_context_created(&mut self, id: ContextId) {
		if let Some(previous) = self.current.replace(id) {
			if previous != id {
				self.superseded.insert(previous);
			}
		}
		self.superseded.remove(&id);
	}

	pub fn current(&self) -> Option<ContextId> {
		self.current
	}

	pub fn is_superseded(&self, id: ContextId) -> bool {
		self.superseded.contains(&id)
	}

	/// Maps a stale page context id to the live one; other ids are unchanged.
	pub fn canonical(&self, id: ContextId) -> ContextId {
		match self.current {
			Some(current) if self.is_superseded(id) => current,
			_ => id,
		}
	}

	pub fn is_current(&self, id: ContextId) -> bool {
		self.current == Some(self.canonical(id))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_stale_ids_map_to_current() {
		let mut contexts = ExecutionContexts::new();
		assert_eq!(contexts.canonical(3), 3);
		assert!(!contexts.is_current(3));

		contexts.page_context_created(3);
		contexts.page_context_created(7);
		contexts.page_context_created(9);

		assert_eq!(contexts.current(), Some(9));
		assert_eq!(contexts.canonical(3), 9);
		assert_eq!(contexts.canonical(7), 9);
		assert_eq!(contexts.canonical(42), 42);
		assert!(contexts.is_current(3));
		assert!(!contexts.is_current(42));
	}

	#[test]
	fn test_recreated_context_is_not_superseded() {
		let mut contexts = ExecutionContexts::new();
		contexts.page_context_created(3);
		contexts.page_context_created(3);
		assert!(!contexts.is_superseded(3));

		contexts.page_context_created(4);
		contexts.page_context_created(3);
		assert!(!contexts.is_superseded(3));
		assert!(contexts.is_superseded(4));
	}
}
