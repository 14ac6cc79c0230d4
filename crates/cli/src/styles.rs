//! Help output colors.

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;

pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default().bold())
		.usage(AnsiColor::Yellow.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Blue.on_default())
		.valid(AnsiColor::Cyan.on_default())
}
