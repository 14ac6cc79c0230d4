use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_url_command() {
	let cli = Cli::try_parse_from(["wvdt", "url", "--port", "51234", "-i", "2"]).unwrap();

	match cli.command {
		Commands::Url(target) => {
			assert_eq!(target.port, Some(51234));
			assert_eq!(target.instance, 2);
			assert_eq!(target.host, None);
		}
		_ => panic!("Expected Url command"),
	}
}

#[test]
fn parse_send_command() {
	let cli = Cli::try_parse_from([
		"wvdt",
		"send",
		"-p",
		"51234",
		"Runtime.evaluate",
		r#"{"expression":"1+1"}"#,
		"--timeout-ms",
		"250",
	])
	.unwrap();

	match cli.command {
		Commands::Send(args) => {
			assert_eq!(args.method, "Runtime.evaluate");
			assert_eq!(args.params.as_deref(), Some(r#"{"expression":"1+1"}"#));
			assert_eq!(args.timeout_ms, Some(250));
			assert_eq!(args.target.port, Some(51234));
			assert_eq!(args.target.instance, 0);
		}
		_ => panic!("Expected Send command"),
	}
}

#[test]
fn parse_send_requires_method() {
	assert!(Cli::try_parse_from(["wvdt", "send", "--port", "1"]).is_err());
}

#[test]
fn parse_global_flags_after_subcommand() {
	let cli = Cli::try_parse_from(["wvdt", "console", "--host", "127.0.0.1", "-vv", "--config", "/tmp/wvdt.json"])
		.unwrap();

	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.config, Some(PathBuf::from("/tmp/wvdt.json")));
	match cli.command {
		Commands::Console(target) => {
			assert_eq!(target.host.as_deref(), Some("127.0.0.1"));
			assert_eq!(target.port, None);
		}
		_ => panic!("Expected Console command"),
	}
}
