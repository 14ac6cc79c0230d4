//! Untyped DevTools protocol frames.
//!
//! The bridge rewrites frames it does not fully understand, so a frame is kept
//! as a JSON object and only the envelope fields (`id`, `method`, `params`,
//! `result`, `error`) get typed accessors. Everything else round-trips as-is.

use std::fmt;

use serde_json::{Map, Value};

/// Request id as used on the wire.
pub type MessageId = i64;

/// Shape of a frame, derived from which envelope fields are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
	/// `{id, method, params}`
	Request,
	/// `{id, result}` or `{id, error}`
	Response,
	/// `{method, params}` without an id
	Event,
	/// Anything else; forwarded untouched.
	Unknown,
}

/// A single protocol frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
	fields: Map<String, Value>,
}

impl Message {
	/// Parses a text frame. Only JSON objects are valid frames.
	pub fn parse(text: &str) -> serde_json::Result<Self> {
		let fields: Map<String, Value> = serde_json::from_str(text)?;
		Ok(Self { fields })
	}

	/// Wraps an already-parsed value, returning `None` for non-objects.
	pub fn from_value(value: Value) -> Option<Self> {
		match value {
			Value::Object(fields) => Some(Self { fields }),
			_ => None,
		}
	}

	/// Builds a request frame. `params` is omitted when `None`.
	pub fn request(id: MessageId, method: &str, params: Option<Value>) -> Self {
		let mut fields = Map::new();
		fields.insert("id".into(), Value::from(id));
		fields.insert("method".into(), Value::from(method));
		if let Some(params) = params {
			fields.insert("params".into(), params);
		}
		Self { fields }
	}

	/// Builds a success response frame.
	pub fn response(id: MessageId, result: Value) -> Self {
		let mut fields = Map::new();
		fields.insert("id".into(), Value::from(id));
		fields.insert("result".into(), result);
		Self { fields }
	}

	/// Builds an event frame.
	pub fn event(method: &str, params: Value) -> Self {
		let mut fields = Map::new();
		fields.insert("method".into(), Value::from(method));
		fields.insert("params".into(), params);
		Self { fields }
	}

	pub fn kind(&self) -> FrameKind {
		let has_id = self.fields.contains_key("id");
		let has_method = self.fields.contains_key("method");
		let has_outcome = self.fields.contains_key("result") || self.fields.contains_key("error");
		match (has_id, has_method, has_outcome) {
			(true, true, _) => FrameKind::Request,
			(true, false, true) => FrameKind::Response,
			(false, true, _) => FrameKind::Event,
			_ => FrameKind::Unknown,
		}
	}

	/// Numeric id, if present.
	pub fn id(&self) -> Option<MessageId> {
		self.fields.get("id").and_then(Value::as_i64)
	}

	pub fn set_id(&mut self, id: MessageId) {
		self.fields.insert("id".into(), Value::from(id));
	}

	pub fn method(&self) -> Option<&str> {
		self.fields.get("method").and_then(Value::as_str)
	}

	pub fn params(&self) -> Option<&Value> {
		self.fields.get("params")
	}

	pub fn params_mut(&mut self) -> Option<&mut Map<String, Value>> {
		self.fields.get_mut("params").and_then(Value::as_object_mut)
	}

	pub fn result(&self) -> Option<&Value> {
		self.fields.get("result")
	}

	pub fn error(&self) -> Option<&Value> {
		self.fields.get("error")
	}

	/// Looks up a nested value by a dotted path such as `params.context.id`.
	pub fn pointer(&self, path: &str) -> Option<&Value> {
		let mut segments = path.split('.');
		let first = segments.next()?;
		segments.try_fold(self.fields.get(first)?, |value, key| value.get(key))
	}

	/// Reads `params.<key>` as a string.
	pub fn param_str(&self, key: &str) -> Option<&str> {
		self.params()?.get(key)?.as_str()
	}

	/// Reads `params.<key>` as an integer.
	pub fn param_i64(&self, key: &str) -> Option<i64> {
		self.params()?.get(key)?.as_i64()
	}

	/// Reads `params.<key>` as a boolean, treating absence as `false`.
	pub fn param_flag(&self, key: &str) -> bool {
		self.params()
			.and_then(|params| params.get(key))
			.and_then(Value::as_bool)
			.unwrap_or(false)
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.fields)
	}
}

impl fmt::Display for Message {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = serde_json::to_string(&self.fields).map_err(|_| fmt::Error)?;
		f.write_str(&text)
	}
}
