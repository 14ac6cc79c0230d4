//! Breakpoint cache keyed by `url:line:column`.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use wvdt_protocol::MessageId;

/// A breakpoint the engine accepted, with the result it answered with.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBreakpoint {
	pub breakpoint_id: String,
	/// `result` object of the original `Debugger.setBreakpointByUrl` response.
	pub response: Value,
}

/// Breakpoints in the order they were set, plus keys the engine has not
/// answered yet.
#[derive(Debug, Default)]
pub struct BreakpointCache {
	entries: IndexMap<String, CachedBreakpoint>,
	/// Key of each unanswered set request, with the front-end ids of repeats
	/// parked behind it.
	in_flight: HashMap<String, Vec<MessageId>>,
}

impl BreakpointCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&CachedBreakpoint> {
		self.entries.get(key)
	}

	/// Records a breakpoint. An existing key keeps its first response.
	pub fn insert(&mut self, key: String, breakpoint_id: String, response: Value) -> bool {
		if self.entries.contains_key(&key) {
			return false;
		}
		self.entries.insert(
			key,
			CachedBreakpoint {
				breakpoint_id,
				response,
			},
		);
		true
	}

	/// Marks `key` as sent to the engine.
	pub fn begin_set(&mut self, key: String) {
		self.in_flight.entry(key).or_default();
	}

	/// Parks `id` behind an unanswered request for `key`. `false` when no
	/// request for `key` is in flight.
	pub fn park(&mut self, key: &str, id: MessageId) -> bool {
		match self.in_flight.get_mut(key) {
			Some(waiting) => {
				waiting.push(id);
				true
			}
			None => false,
		}
	}

	/// Ends the in-flight request for `key`, returning the parked ids in arrival order.
	pub fn settle(&mut self, key: &str) -> Vec<MessageId> {
		self.in_flight.remove(key).unwrap_or_default()
	}

	pub fn has_in_flight(&self) -> bool {
		!self.in_flight.is_empty()
	}

	pub fn contains_id(&self, breakpoint_id: &str) -> bool {
		self.entries
			.values()
			.any(|entry| entry.breakpoint_id == breakpoint_id)
	}

	pub fn remove_by_id(&mut self, breakpoint_id: &str) -> Option<CachedBreakpoint> {
		let index = self
			.entries
			.values()
			.position(|entry| entry.breakpoint_id == breakpoint_id)?;
		self.entries.shift_remove_index(index).map(|(_, entry)| entry)
	}

	/// Empties the cache, returning breakpoint ids in insertion order.
	pub fn drain_ids(&mut self) -> Vec<String> {
		self.entries
			.drain(..)
			.map(|(_, entry)| entry.breakpoint_id)
			.collect()
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
	use serde_json::json;

	use super::*;

	#[test]
	fn test_duplicate_key_keeps_first_response() {
		let mut cache = BreakpointCache::new();

		assert!(cache.insert("app.js:3:0".into(), "1".into(), json!({"breakpointId": "1"})));
		assert!(!cache.insert("app.js:3:0".into(), "2".into(), json!({"breakpointId": "2"})));

		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get("app.js:3:0").unwrap().breakpoint_id, "1");
		assert!(!cache.contains_id("2"));
	}

	#[test]
	fn test_remove_and_drain_preserve_order() {
		let mut cache = BreakpointCache::new();
		for (line, id) in [(1, "a"), (2, "b"), (3, "c")] {
			cache.insert(format!("app.js:{line}:0"), id.into(), json!({}));
		}

		let removed = cache.remove_by_id("b").unwrap();
		assert_eq!(removed.breakpoint_id, "b");
		assert!(cache.remove_by_id("b").is_none());
		assert!(cache.get("app.js:2:0").is_none());

		assert_eq!(cache.drain_ids(), vec!["a", "c"]);
		assert!(cache.is_empty());
	}

	#[test]
	fn test_repeats_park_behind_in_flight_key() {
		let mut cache = BreakpointCache::new();
		assert!(!cache.park("app.js:3:0", 7));

		cache.begin_set("app.js:3:0".into());
		assert!(cache.has_in_flight());
		assert!(cache.park("app.js:3:0", 7));
		assert!(cache.park("app.js:3:0", 9));
		assert!(!cache.park("app.js:4:0", 8));

		assert_eq!(cache.settle("app.js:3:0"), vec![7, 9]);
		assert!(!cache.has_in_flight());
		assert!(cache.settle("app.js:3:0").is_empty());
	}
}
