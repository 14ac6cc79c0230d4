//! Local mirror of the page's DOM node ids.
//!
//! The engine cannot highlight nodes by id, so the translator keeps enough
//! structure to turn a node id into a path of child ordinals from the
//! document root. Nodes live in an arena keyed by id; parent links are ids.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use wvdt_protocol::NodeId;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
	#[error("node without a nodeId")]
	MissingNodeId,

	#[error("unknown parent node {0}")]
	UnknownParent(NodeId),

	#[error("node {node} is not a child of {parent}")]
	NotAChild { parent: NodeId, node: NodeId },

	#[error("unknown previous sibling {0}")]
	UnknownSibling(NodeId),
}

#[derive(Debug, Default)]
struct DomNode {
	parent: Option<NodeId>,
	ordinal: usize,
	children: Vec<NodeId>,
}

/// Node description parsed from a protocol `Node` object.
#[derive(Debug)]
struct NodeDesc {
	id: NodeId,
	/// `None` when the notification did not carry the child list.
	children: Option<Vec<NodeDesc>>,
}

impl NodeDesc {
	fn parse(value: &Value) -> Result<Self, DomError> {
		let id = value
			.get("nodeId")
			.and_then(Value::as_i64)
			.ok_or(DomError::MissingNodeId)?;
		let children = match value.get("children").and_then(Value::as_array) {
			Some(children) => Some(Self::parse_list(children)?),
			None => None,
		};
		Ok(Self { id, children })
	}

	fn parse_list(values: &[Value]) -> Result<Vec<Self>, DomError> {
		values.iter().map(Self::parse).collect()
	}
}

#[derive(Debug, Default)]
pub struct ShadowDom {
	nodes: HashMap<NodeId, DomNode>,
	root: Option<NodeId>,
}

impl ShadowDom {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn root(&self) -> Option<NodeId> {
		self.root
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.root = None;
	}

	/// Replaces the tree with the document from a `DOM.getDocument` result.
	pub fn set_document(&mut self, root: &Value) -> Result<(), DomError> {
		let desc = NodeDesc::parse(root)?;
		self.clear();
		self.root = Some(desc.id);
		self.nodes.insert(desc.id, DomNode::default());
		if let Some(children) = desc.children {
			self.replace_children(desc.id, children);
		}
		Ok(())
	}

	/// Applies `DOM.setChildNodes`. An unknown parent gets a detached entry.
	pub fn set_child_nodes(&mut self, parent: NodeId, nodes: &[Value]) -> Result<(), DomError> {
		let children = NodeDesc::parse_list(nodes)?;
		self.nodes.entry(parent).or_default();
		self.replace_children(parent, children);
		Ok(())
	}

	/// Applies `DOM.childNodeInserted`; `previous == 0` inserts first.
	pub fn insert_child(&mut self, parent: NodeId, previous: NodeId, node: &Value) -> Result<(), DomError> {
		let desc = NodeDesc::parse(node)?;
		let siblings = &self
			.nodes
			.get(&parent)
			.ok_or(DomError::UnknownParent(parent))?
			.children;
		if previous != 0 && !siblings.contains(&previous) {
			return Err(DomError::UnknownSibling(previous));
		}
		self.detach(desc.id);

		let entry = self
			.nodes
			.get_mut(&parent)
			.ok_or(DomError::UnknownParent(parent))?;
		let position = if previous == 0 {
			0
		} else {
			entry
				.children
				.iter()
				.position(|&id| id == previous)
				.map(|index| index + 1)
				.ok_or(DomError::UnknownSibling(previous))?
		};
		entry.children.insert(position, desc.id);
		self.adopt(parent, desc);
		self.renumber(parent);
		Ok(())
	}

	/// Applies `DOM.childNodeRemoved`, dropping the removed subtree.
	pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
		let entry = self
			.nodes
			.get_mut(&parent)
			.ok_or(DomError::UnknownParent(parent))?;
		let index = entry
			.children
			.iter()
			.position(|&id| id == node)
			.ok_or(DomError::NotAChild { parent, node })?;
		entry.children.remove(index);
		self.renumber(parent);
		self.drop_subtree(node);
		Ok(())
	}

	/// Child ordinals leading from the root to `node`, outermost first.
	///
	/// Empty for the root itself; `None` when the node is not connected to
	/// the root.
	pub fn path_to(&self, node: NodeId) -> Option<Vec<usize>> {
		let root = self.root?;
		let mut path = Vec::new();
		let mut current = node;
		while current != root {
			if path.len() > self.nodes.len() {
				return None;
			}
			let entry = self.nodes.get(&current)?;
			path.push(entry.ordinal);
			current = entry.parent?;
		}
		path.reverse();
		Some(path)
	}

	/// Follows child ordinals from the root.
	pub fn resolve(&self, path: &[usize]) -> Option<NodeId> {
		path.iter().try_fold(self.root?, |id, &ordinal| {
			self.nodes.get(&id)?.children.get(ordinal).copied()
		})
	}

	fn replace_children(&mut self, parent: NodeId, children: Vec<NodeDesc>) {
		let previous = self
			.nodes
			.get_mut(&parent)
			.map(|entry| std::mem::take(&mut entry.children))
			.unwrap_or_default();
		for old in previous {
			if !children.iter().any(|desc| desc.id == old) {
				self.drop_subtree(old);
			}
		}

		let ids: Vec<NodeId> = children.iter().map(|desc| desc.id).collect();
		for desc in children {
			self.detach(desc.id);
			self.adopt(parent, desc);
		}
		if let Some(entry) = self.nodes.get_mut(&parent) {
			entry.children = ids;
		}
		self.renumber(parent);
	}

	/// Registers `desc` under `parent` without touching the parent's child list.
	fn adopt(&mut self, parent: NodeId, desc: NodeDesc) {
		let entry = self.nodes.entry(desc.id).or_default();
		entry.parent = Some(parent);
		if let Some(children) = desc.children {
			self.replace_children(desc.id, children);
		}
	}

	/// Unlinks a node from its current parent, keeping its subtree.
	fn detach(&mut self, id: NodeId) {
		let Some(parent) = self.nodes.get(&id).and_then(|entry| entry.parent) else {
			return;
		};
		if let Some(entry) = self.nodes.get_mut(&parent) {
			entry.children.retain(|&child| child != id);
		}
		self.renumber(parent);
		if let Some(entry) = self.nodes.get_mut(&id) {
			entry.parent = None;
		}
	}

	fn renumber(&mut self, parent: NodeId) {
		let children = match self.nodes.get(&parent) {
			Some(entry) => entry.children.clone(),
			None => return,
		};
		for (ordinal, child) in children.into_iter().enumerate() {
			if let Some(entry) = self.nodes.get_mut(&child) {
				entry.ordinal = ordinal;
				entry.parent = Some(parent);
			}
		}
	}

	fn drop_subtree(&mut self, id: NodeId) {
		let mut stack = vec![id];
		while let Some(id) = stack.pop() {
			if let Some(entry) = self.nodes.remove(&id) {
				stack.extend(entry.children);
			}
		}
		if self.root == Some(id) {
			self.root = None;
		}
	}
}
