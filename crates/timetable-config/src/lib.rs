//! Configuration for the timetable service.
//!
//! Files are TOML by default; `.json`, `.yaml` and `.yml` are picked by
//! extension. `${VAR}` placeholders are substituted from the environment
//! before parsing, then `TIMETABLE_*` variables override individual fields.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
