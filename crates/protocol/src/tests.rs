use serde_json::json;

use super::*;

#[test]
fn test_frame_kind_classification() {
	let request = Message::parse(r#"{"id":1,"method":"Runtime.enable"}"#).unwrap();
	let response = Message::parse(r#"{"id":1,"result":{}}"#).unwrap();
	let error = Message::parse(r#"{"id":1,"error":{"code":-32601,"message":"nope"}}"#).unwrap();
	let event = Message::parse(r#"{"method":"Debugger.resumed"}"#).unwrap();

	assert_eq!(request.kind(), FrameKind::Request);
	assert_eq!(response.kind(), FrameKind::Response);
	assert_eq!(error.kind(), FrameKind::Response);
	assert_eq!(event.kind(), FrameKind::Event);
}

#[test]
fn test_non_object_frames_rejected() {
	assert!(Message::parse("[1,2]").is_err());
	assert!(Message::parse("not json").is_err());
	assert!(Message::from_value(json!(5)).is_none());
}

#[test]
fn test_pointer_and_params() {
	let message = Message::parse(
		r#"{"method":"Runtime.executionContextCreated","params":{"context":{"id":7,"isPageContext":true}}}"#,
	)
	.unwrap();

	assert_eq!(message.pointer("params.context.id"), Some(&json!(7)));
	assert!(message.pointer("params.context.missing").is_none());
	assert!(!message.param_flag("silent"));
}

#[test]
fn test_set_id_preserves_other_fields() {
	let mut message =
		Message::parse(r#"{"id":3,"result":{"breakpointId":"a.js:1:0"},"extra":true}"#).unwrap();
	message.set_id(42);

	assert_eq!(
		message.into_value(),
		json!({"id": 42, "result": {"breakpointId": "a.js:1:0"}, "extra": true})
	);
}

#[test]
fn test_breakpoint_key() {
	let params: SetBreakpointByUrlParams =
		serde_json::from_value(json!({"url": "x.js", "lineNumber": 10, "columnNumber": 0})).unwrap();
	assert_eq!(params.key().as_deref(), Some("x.js:10:0"));

	let no_column: SetBreakpointByUrlParams =
		serde_json::from_value(json!({"url": "x.js", "lineNumber": 4})).unwrap();
	assert_eq!(no_column.key().as_deref(), Some("x.js:4:0"));

	let no_url: SetBreakpointByUrlParams =
		serde_json::from_value(json!({"urlRegex": ".*", "lineNumber": 4})).unwrap();
	assert!(no_url.key().is_none());
}

#[test]
fn test_evaluate_standard_flags() {
	let mut params = EvaluateParams::console("1 + 1", Some(3));
	assert!(params.has_standard_flags());

	params.return_by_value = true;
	assert!(!params.has_standard_flags());

	let parsed: EvaluateParams =
		serde_json::from_value(json!({"expression": "x", "awaitPromise": true})).unwrap();
	assert!(!parsed.has_standard_flags());
	assert_eq!(parsed.context_id, None);
}

#[test]
fn test_stack_trace_drops_innermost_frame() {
	let paused: PausedParams = serde_json::from_value(json!({
		"callFrames": [
			{"callFrameId": "0", "functionName": "consoleLog", "location": {"scriptId": "9", "lineNumber": 33, "columnNumber": 8}},
			{"callFrameId": "1", "functionName": "render", "location": {"scriptId": "12", "lineNumber": 4, "columnNumber": 2}}
		],
		"reason": "other"
	}))
	.unwrap();

	let stack = StackTrace::from_pause(&paused.call_frames);
	assert_eq!(stack.call_frames.len(), 1);
	assert_eq!(stack.call_frames[0].function_name, "render");
	assert_eq!(stack.call_frames[0].script_id, "12");
	assert_eq!(stack.call_frames[0].url, "");

	let single = StackTrace::from_pause(&paused.call_frames[..1]);
	assert_eq!(single.call_frames.len(), 1);
	assert_eq!(single.call_frames[0].function_name, "consoleLog");
}

#[test]
fn test_paused_breakpoint_id() {
	let hit: PausedParams = serde_json::from_value(json!({
		"callFrames": [],
		"reason": "Breakpoint",
		"data": {"breakpointId": "a.js:10:0"}
	}))
	.unwrap();
	assert_eq!(hit.breakpoint_id(), Some("a.js:10:0"));

	let other: PausedParams =
		serde_json::from_value(json!({"callFrames": [], "reason": "other"})).unwrap();
	assert_eq!(other.breakpoint_id(), None);
}

#[test]
fn test_page_context_detection() {
	let legacy: ExecutionContextDescription =
		serde_json::from_value(json!({"id": 6, "isPageContext": true, "name": ""})).unwrap();
	let modern: ExecutionContextDescription =
		serde_json::from_value(json!({"id": 7, "auxData": {"isDefault": true}})).unwrap();
	let isolated: ExecutionContextDescription =
		serde_json::from_value(json!({"id": 8, "auxData": {"isDefault": false}})).unwrap();

	assert!(legacy.is_page());
	assert!(modern.is_page());
	assert!(!isolated.is_page());
}

#[test]
fn test_script_value_expressions() {
	assert_eq!(ScriptValue::undefined().to_expression(), "undefined");
	assert_eq!(ScriptValue::null().to_expression(), "null");
	assert_eq!(ScriptValue::bool(true).to_expression(), "true");
	assert_eq!(ScriptValue::number(1.5).to_expression(), "1.5");
	assert_eq!(ScriptValue::number(f64::NAN).to_expression(), "NaN");
	assert_eq!(ScriptValue::number(f64::NEG_INFINITY).to_expression(), "-Infinity");
	assert_eq!(ScriptValue::string("say \"hi\"").to_expression(), r#""say \"hi\"""#);
	assert_eq!(ScriptValue::handle("window.__args[0]").to_expression(), "(window.__args[0])");
}

#[test]
fn test_script_exception_class_name() {
	let exception = ScriptException::from_message("ReferenceError: Can't find variable: b");
	assert_eq!(exception.class_name, "ReferenceError");
	assert_eq!(exception.message, "ReferenceError: Can't find variable: b");

	let bare = ScriptException::from_message("something broke");
	assert_eq!(bare.class_name, "Error");
}

#[test]
fn test_console_type_names() {
	assert_eq!("warn".parse::<ConsoleApiType>().unwrap(), ConsoleApiType::Warning);
	assert_eq!("groupCollapsed".parse::<ConsoleApiType>().unwrap(), ConsoleApiType::StartGroupCollapsed);
	assert_eq!("bogus".parse::<ConsoleApiType>().unwrap(), ConsoleApiType::Log);
	assert_eq!(serde_json::to_value(ConsoleApiType::EndGroup).unwrap(), json!("endGroup"));
	assert_eq!(ConsoleApiType::Warning.as_str(), "warning");
}

#[test]
fn test_resource_paths_and_urls() {
	let root = ResourcePath::for_instance(0);
	let second = ResourcePath::for_instance(2);

	assert_eq!(root.as_str(), "/");
	assert_eq!(second.as_str(), "/?2");
	assert_eq!(
		second.debug_url("localhost", 51234),
		"devtools://devtools/bundled/inspector.html?ws=localhost:51234/?2"
	);
	assert_eq!(root.websocket_url("localhost", 9222), "ws://localhost:9222/");
	assert_eq!(ResourcePath::from_request("/?2"), second);
}

#[test]
fn test_thrown_evaluate_result_shape() {
	let value = thrown_evaluate_result("TypeError", "TypeError: x is not a function");
	assert_eq!(value["wasThrown"], json!(true));
	assert_eq!(value["result"]["subtype"], json!("error"));
	assert_eq!(value["result"]["className"], json!("TypeError"));
}
