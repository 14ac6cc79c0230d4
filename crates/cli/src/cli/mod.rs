#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::styles::cli_styles;

/// Front-end side client for WebView debug sessions.
#[derive(Parser, Debug)]
#[command(name = "wvdt")]
#[command(about = "Inspect and drive wvdt debug sessions from the command line")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON file with defaults for port, host and timeout_ms
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Print the DevTools URL of a session.
	Url(TargetArgs),
	/// Send one request and print the response with any events seen meanwhile.
	Send(SendArgs),
	/// Stream console output of a session until interrupted.
	Console(TargetArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
	/// Debug server port
	#[arg(short, long)]
	pub port: Option<u16>,

	/// Debug server host
	#[arg(long)]
	pub host: Option<String>,

	/// Session instance id (0 is served at `/`)
	#[arg(short, long, default_value_t = 0)]
	pub instance: u32,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
	#[command(flatten)]
	pub target: TargetArgs,

	/// Protocol method, e.g. Runtime.evaluate
	#[arg(value_name = "METHOD")]
	pub method: String,

	/// JSON object with the request params
	#[arg(value_name = "PARAMS")]
	pub params: Option<String>,

	/// How long to wait for the response
	#[arg(long, value_name = "MS")]
	pub timeout_ms: Option<u64>,
}
