use serde_json::json;

use super::*;

fn document() -> ShadowDom {
	let mut dom = ShadowDom::new();
	dom.set_document(&json!({
		"nodeId": 1,
		"nodeName": "#document",
		"children": [{
			"nodeId": 2,
			"nodeName": "HTML",
			"children": [
				{"nodeId": 3, "nodeName": "HEAD"},
				{"nodeId": 4, "nodeName": "BODY", "children": [
					{"nodeId": 5, "nodeName": "DIV"},
					{"nodeId": 6, "nodeName": "P"}
				]}
			]
		}]
	}))
	.unwrap();
	dom
}

fn assert_round_trips(dom: &ShadowDom) {
	for id in dom.nodes.keys().copied() {
		if let Some(path) = dom.path_to(id) {
			assert_eq!(dom.resolve(&path), Some(id), "path {path:?} of node {id}");
		}
	}
}

#[test]
fn test_document_paths() {
	let dom = document();

	assert_eq!(dom.root(), Some(1));
	assert_eq!(dom.path_to(1), Some(vec![]));
	assert_eq!(dom.path_to(4), Some(vec![0, 1]));
	assert_eq!(dom.path_to(6), Some(vec![0, 1, 1]));
	assert_eq!(dom.path_to(99), None);
	assert_round_trips(&dom);
}

#[test]
fn test_set_child_nodes_replaces_children() {
	let mut dom = document();

	dom.set_child_nodes(4, &[json!({"nodeId": 6}), json!({"nodeId": 7, "children": [{"nodeId": 8}]})])
		.unwrap();

	assert!(!dom.contains(5));
	assert_eq!(dom.path_to(6), Some(vec![0, 1, 0]));
	assert_eq!(dom.path_to(8), Some(vec![0, 1, 1, 0]));
	assert_round_trips(&dom);
}

#[test]
fn test_set_child_nodes_for_unknown_parent_is_detached() {
	let mut dom = document();

	dom.set_child_nodes(50, &[json!({"nodeId": 51})]).unwrap();

	assert!(dom.contains(50));
	assert_eq!(dom.path_to(51), None);
}

#[test]
fn test_insert_positions() {
	let mut dom = document();

	dom.insert_child(4, 0, &json!({"nodeId": 10})).unwrap();
	dom.insert_child(4, 5, &json!({"nodeId": 11})).unwrap();

	assert_eq!(dom.nodes[&4].children, vec![10, 5, 11, 6]);
	assert_eq!(dom.path_to(6), Some(vec![0, 1, 3]));
	assert_round_trips(&dom);
}

#[test]
fn test_insert_moves_existing_node() {
	let mut dom = document();

	dom.insert_child(2, 4, &json!({"nodeId": 5})).unwrap();

	assert_eq!(dom.nodes[&4].children, vec![6]);
	assert_eq!(dom.path_to(5), Some(vec![0, 2]));
	assert_eq!(dom.path_to(6), Some(vec![0, 1, 0]));
	assert_round_trips(&dom);
}

#[test]
fn test_insert_rejects_unknown_sibling_without_mutating() {
	let mut dom = document();

	assert_eq!(
		dom.insert_child(4, 77, &json!({"nodeId": 5})),
		Err(DomError::UnknownSibling(77))
	);
	assert_eq!(dom.nodes[&4].children, vec![5, 6]);
	assert_eq!(
		dom.insert_child(40, 0, &json!({"nodeId": 41})),
		Err(DomError::UnknownParent(40))
	);
	assert_eq!(
		dom.insert_child(4, 0, &json!({"nodeName": "SPAN"})),
		Err(DomError::MissingNodeId)
	);
}

#[test]
fn test_remove_drops_subtree_and_renumbers() {
	let mut dom = document();

	dom.remove_child(2, 3).unwrap();

	assert!(!dom.contains(3));
	assert_eq!(dom.path_to(4), Some(vec![0, 0]));
	assert_eq!(dom.path_to(6), Some(vec![0, 0, 1]));

	dom.remove_child(2, 4).unwrap();
	assert!(!dom.contains(5));
	assert!(!dom.contains(6));
	assert_eq!(dom.remove_child(2, 4), Err(DomError::NotAChild { parent: 2, node: 4 }));
	assert_round_trips(&dom);
}

#[test]
fn test_new_document_clears_previous_tree() {
	let mut dom = document();

	dom.set_document(&json!({"nodeId": 100})).unwrap();

	assert_eq!(dom.len(), 1);
	assert_eq!(dom.root(), Some(100));
	assert_eq!(dom.path_to(4), None);

	dom.clear();
	assert!(dom.is_empty());
	assert_eq!(dom.resolve(&[]), None);
}
