use std::time::Duration;

use anyhow::{Context, Result, bail};
use colored::{ColoredString, Colorize};
use serde_json::Value;
use tracing::info;
use wvdt_protocol::{ConsoleApiType, Message};

use crate::cli::{Cli, Commands, SendArgs, TargetArgs};
use crate::client::DevToolsClient;
use crate::config::CliConfig;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config = CliConfig::load(cli.config.as_deref())?;
	match cli.command {
		Commands::Url(target) => url(&config, &target),
		Commands::Send(args) => send(&config, args).await,
		Commands::Console(target) => console(&config, &target).await,
	}
}

fn url(config: &CliConfig, target: &TargetArgs) -> Result<()> {
	let target = config.resolve(target)?;
	println!("{}", target.debug_url());
	Ok(())
}

async fn send(config: &CliConfig, args: SendArgs) -> Result<()> {
	let target = config.resolve(&args.target)?;
	let params = args
		.params
		.as_deref()
		.map(parse_params)
		.transpose()?;
	let timeout = Duration::from_millis(args.timeout_ms.unwrap_or(config.timeout_ms));

	let mut client = DevToolsClient::connect(&target.websocket_url()).await?;
	let exchange = client.call(&args.method, params, timeout).await?;
	client.close().await?;

	for event in &exchange.events {
		println!("{event}");
	}
	println!("{}", exchange.response);

	if let Some(error) = exchange.response.error() {
		let message = error.get("message").and_then(Value::as_str).unwrap_or("unknown error");
		bail!("{} failed: {message}", args.method);
	}
	Ok(())
}

fn parse_params(raw: &str) -> Result<Value> {
	let params: Value = serde_json::from_str(raw).context("PARAMS is not valid JSON")?;
	if !params.is_object() {
		bail!("PARAMS must be a JSON object");
	}
	Ok(params)
}

async fn console(config: &CliConfig, target: &TargetArgs) -> Result<()> {
	let target = config.resolve(target)?;
	let timeout = Duration::from_millis(config.timeout_ms);

	let mut client = DevToolsClient::connect(&target.websocket_url()).await?;
	client.call("Runtime.enable", None, timeout).await?;
	info!(target = "wvdt.client", url = %target.websocket_url(), "streaming console output");

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => break,
			message = client.next_message() => {
				let Some(message) = message? else {
					eprintln!("{}", "session closed".dimmed());
					return Ok(());
				};
				if let Some(line) = console_line(&message) {
					println!("{line}");
				}
			}
		}
	}
	client.close().await
}

/// Renders a `Runtime.consoleAPICalled` event, `None` for anything else.
fn console_line(message: &Message) -> Option<ColoredString> {
	if message.method() != Some("Runtime.consoleAPICalled") {
		return None;
	}
	let kind = message
		.param_str("type")
		.and_then(|name| name.parse::<ConsoleApiType>().ok())
		.unwrap_or_default();
	let args = message
		.pointer("params.args")
		.and_then(Value::as_array)
		.map(|args| args.iter().map(render_remote_object).collect::<Vec<_>>().join(" "))
		.unwrap_or_default();
	let text = format!("[{}] {args}", kind.as_str());

	Some(match kind {
		ConsoleApiType::Error | ConsoleApiType::Assert => text.red(),
		ConsoleApiType::Warning => text.yellow(),
		ConsoleApiType::Debug => text.dimmed(),
		_ => text.normal(),
	})
}

/// Short text for a remote object: primitives by value, objects by description.
fn render_remote_object(object: &Value) -> String {
	if let Some(value) = object.get("value") {
		return match value {
			Value::String(text) => text.clone(),
			other => other.to_string(),
		};
	}
	for key in ["unserializableValue", "description"] {
		if let Some(text) = object.get(key).and_then(Value::as_str) {
			return text.to_string();
		}
	}
	object
		.get("type")
		.and_then(Value::as_str)
		.unwrap_or("undefined")
		.to_string()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_render_remote_objects() {
		assert_eq!(render_remote_object(&json!({"type": "string", "value": "hi"})), "hi");
		assert_eq!(render_remote_object(&json!({"type": "number", "value": 4.5})), "4.5");
		assert_eq!(render_remote_object(&json!({"type": "object", "value": null})), "null");
		assert_eq!(
			render_remote_object(&json!({"type": "number", "unserializableValue": "NaN"})),
			"NaN"
		);
		assert_eq!(
			render_remote_object(&json!({"type": "object", "subtype": "error", "description": "TypeError: x"})),
			"TypeError: x"
		);
		assert_eq!(render_remote_object(&json!({"type": "undefined"})), "undefined");
	}

	#[test]
	fn test_console_line() {
		colored::control::set_override(false);
		let event = Message::event(
			"Runtime.consoleAPICalled",
			json!({"type": "warning", "args": [{"type": "string", "value": "low"}, {"type": "number", "value": 3}]}),
		);

		let line = console_line(&event).unwrap();
		assert_eq!(line.to_string(), "[warning] low 3");

		let other = Message::event("Debugger.paused", json!({}));
		assert!(console_line(&other).is_none());
	}

	#[test]
	fn test_params_must_be_an_object() {
		assert!(parse_params(r#"{"expression": "1"}"#).is_ok());
		assert!(parse_params("[1]").is_err());
		assert!(parse_params("{").is_err());
	}
}
