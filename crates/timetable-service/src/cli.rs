//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "config/local.toml";

#[derive(Parser, Debug)]
#[command(name = "timetable")]
#[command(about = "School timetable service", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file
	#[arg(short, long, env = "CONFIG_FILE", default_value = DEFAULT_CONFIG)]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "LOG_LEVEL")]
	pub log_level: Option<String>,

	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
	/// Start the HTTP API
	Start,
	/// Validate the configuration file
	Validate,
	/// Regenerate the prompt rows of a shift
	RebuildPrompt {
		/// Shift to rebuild
		#[arg(long)]
		shift: u32,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_to_start() {
		let cli = Cli::try_parse_from(["timetable"]).unwrap();
		assert!(cli.command.is_none());
		assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
	}

	#[test]
	fn test_rebuild_prompt_requires_shift() {
		let cli = Cli::try_parse_from(["timetable", "rebuild-prompt", "--shift", "3"]).unwrap();
		assert_eq!(cli.command, Some(Command::RebuildPrompt { shift: 3 }));
		assert!(Cli::try_parse_from(["timetable", "rebuild-prompt"]).is_err());
	}

	#[test]
	fn test_global_options() {
		let cli = Cli::try_parse_from(["timetable", "-c", "prod.yaml", "--log-level", "debug", "validate"])
			.unwrap();
		assert_eq!(cli.config, PathBuf::from("prod.yaml"));
		assert_eq!(cli.log_level.as_deref(), Some("debug"));
		assert_eq!(cli.command, Some(Command::Validate));
	}
}
