//! Translator configuration.

use serde::{Deserialize, Serialize};

/// What to do with a DOM mutation notification that does not fit the
/// shadow tree (unknown parent, missing node id, unknown sibling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomMutationPolicy {
	/// Log a warning, leave the tree untouched and still forward the event.
	#[default]
	Skip,
	/// Drop the event and report [`Error::MalformedDomNotification`](crate::Error::MalformedDomNotification).
	Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
	/// Page-side helper object receiving highlight requests.
	pub helper_object: String,
	/// Object group of the helper injection evaluate.
	pub helper_object_group: String,
	/// Page object wrapped around fast-path expressions that ask for the
	/// command line API, as in `with (obj) { expr }`.
	pub command_line_api_object: Option<String>,
	pub dom_mutation_policy: DomMutationPolicy,
	/// Send `Network.enable` when the translator starts.
	pub enable_network_on_start: bool,
}

impl Default for TranslatorConfig {
	fn default() -> Self {
		Self {
			helper_object: "devtoolsHelper".to_string(),
			helper_object_group: "devtoolsHelperInjected".to_string(),
			command_line_api_object: None,
			dom_mutation_policy: DomMutationPolicy::Skip,
			enable_network_on_start: true,
		}
	}
}
