//! Configuration loading from files and environment.

use crate::types::{StorageKind, TimetableConfig, MAX_LESSONS_PER_DAY};
use crate::ConfigError;
use regex::{Captures, Regex};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "TIMETABLE_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads the file (if any), applies overrides and validates.
	///
	/// Without a file the defaults are used, which keeps `timetable start`
	/// usable on a fresh checkout.
	pub async fn load(&self) -> Result<TimetableConfig, ConfigError> {
		let mut config = match &self.file_path {
			Some(path) => Self::load_from_file(path).await?,
			None => TimetableConfig::default(),
		};

		self.apply_env_overrides(&mut config, |name| env::var(name).ok())?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(path: &Path) -> Result<TimetableConfig, ConfigError> {
		info!("Loading configuration from {:?}", path);

		let content = match tokio::fs::read_to_string(path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ConfigError::FileNotFound(path.display().to_string()))
			}
			Err(e) => return Err(e.into()),
		};

		let substituted = substitute_env_vars(&content, |name| env::var(name).ok())?;
		parse_config(path, &substituted)
	}

	fn apply_env_overrides<F>(&self, config: &mut TimetableConfig, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |suffix: &str| lookup(&format!("{}{}", self.env_prefix, suffix));

		if let Some(log_level) = var("LOG_LEVEL") {
			debug!("Overriding log level from environment");
			config.service.log_level = log_level;
		}

		if let Some(host) = var("HTTP_HOST") {
			debug!("Overriding HTTP host from environment");
			config.service.host = host;
		}

		if let Some(port) = var("HTTP_PORT") {
			config.service.port = port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Some(path) = var("STORAGE_PATH") {
			debug!("Overriding storage path from environment");
			config.storage.path = Some(PathBuf::from(path));
		}

		Ok(())
	}
}

/// Parses configuration text, choosing the format from the file extension.
pub fn parse_config(path: &Path, contents: &str) -> Result<TimetableConfig, ConfigError> {
	match path.extension().and_then(|s| s.to_str()) {
		Some("json") => {
			serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some("yaml") | Some("yml") => {
			serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some("toml") | None => {
			toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some(other) => Err(ConfigError::ParseError(format!(
			"Unsupported config format: {}",
			other
		))),
	}
}

/// Replaces every `${VAR_NAME}` with the value returned by `lookup`.
///
/// Substituted values are inserted verbatim; a `${...}` inside a value is
/// not expanded again. The first unknown variable is reported.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
		.map_err(|e| ConfigError::ParseError(e.to_string()))?;

	let mut missing: Option<String> = None;
	let result = re.replace_all(content, |caps: &Captures| match lookup(&caps[1]) {
		Some(value) => value,
		None => {
			missing.get_or_insert_with(|| caps[1].to_string());
			String::new()
		}
	});

	match missing {
		Some(name) => Err(ConfigError::EnvVarNotFound(name)),
		None => Ok(result.into_owned()),
	}
}

/// Checks cross-field constraints the types cannot express.
pub fn validate_config(config: &TimetableConfig) -> Result<(), ConfigError> {
	if config.service.port == 0 {
		return Err(ConfigError::ValidationError(
			"HTTP port must be non-zero".to_string(),
		));
	}

	if config.storage.backend == StorageKind::File && config.storage.path.is_none() {
		return Err(ConfigError::ValidationError(
			"File storage requires storage.path".to_string(),
		));
	}

	let schedule = &config.schedule;
	if !(1..=7).contains(&schedule.days_per_week) {
		return Err(ConfigError::ValidationError(format!(
			"days_per_week must be between 1 and 7, got {}",
			schedule.days_per_week
		)));
	}
	if !(1..=MAX_LESSONS_PER_DAY).contains(&schedule.lessons_per_day) {
		return Err(ConfigError::ValidationError(format!(
			"lessons_per_day must be between 1 and {}, got {}",
			MAX_LESSONS_PER_DAY, schedule.lessons_per_day
		)));
	}
	if schedule.max_same_subject_per_day == 0 {
		return Err(ConfigError::ValidationError(
			"max_same_subject_per_day must be at least 1".to_string(),
		));
	}

	Ok(())
}
