//! Values crossing the host scripting bridge.

use std::fmt;

/// A value produced by, or handed to, the page's script engine.
///
/// Primitives are carried by value. Anything else stays in the page and is
/// referred to by a [`Handle`](ScriptValue::Handle): an expression that
/// evaluates to the object when run in the page context.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Handle(String),
}

impl ScriptValue {
	pub fn undefined() -> Self {
		Self::Undefined
	}

	pub fn null() -> Self {
		Self::Null
	}

	pub fn bool(value: bool) -> Self {
		Self::Bool(value)
	}

	pub fn number(value: f64) -> Self {
		Self::Number(value)
	}

	pub fn string(value: impl Into<String>) -> Self {
		Self::String(value.into())
	}

	/// Reference to a page-side object through an expression.
	pub fn handle(expression: impl Into<String>) -> Self {
		Self::Handle(expression.into())
	}

	/// JavaScript source that evaluates to this value.
	pub fn to_expression(&self) -> String {
		match self {
			Self::Undefined => "undefined".to_string(),
			Self::Null => "null".to_string(),
			Self::Bool(value) => value.to_string(),
			Self::Number(value) if value.is_nan() => "NaN".to_string(),
			Self::Number(value) if value.is_infinite() => {
				if value.is_sign_positive() {
					"Infinity".to_string()
				} else {
					"-Infinity".to_string()
				}
			}
			Self::Number(value) => value.to_string(),
			Self::String(value) => {
				serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
			}
			Self::Handle(expression) => format!("({expression})"),
		}
	}
}

/// Exception raised by a host-side evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptException {
	pub class_name: String,
	pub message: String,
}

impl ScriptException {
	/// Splits an engine message like `ReferenceError: Can't find variable: b`
	/// into class name and full description.
	pub fn from_message(message: impl Into<String>) -> Self {
		let message = message.into();
		let class_name = match message.find(':') {
			Some(pos) if pos > 0 => message[..pos].trim().to_string(),
			_ => "Error".to_string(),
		};
		Self {
			class_name,
			message,
		}
	}
}

impl fmt::Display for ScriptException {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)
	}
}

impl std::error::Error for ScriptException {}
