//! Configuration types for the timetable service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimetableConfig {
	/// HTTP listener and identity
	#[serde(default)]
	pub service: ServiceSettings,
	/// Where the school snapshot is persisted
	#[serde(default)]
	pub storage: StorageConfig,
	/// Weekly grid bounds
	#[serde(default)]
	pub schedule: ScheduleConfig,
	/// Prompt table maintenance
	#[serde(default)]
	pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
	/// Service name for logging
	#[serde(default = "default_name")]
	pub name: String,
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// Default tracing filter, overridden by `RUST_LOG`
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

impl Default for ServiceSettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			host: default_host(),
			port: default_port(),
			log_level: default_log_level(),
		}
	}
}

impl ServiceSettings {
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Storage backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
	Memory,
	#[default]
	File,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	#[serde(default)]
	pub backend: StorageKind,
	/// Base directory for the file backend
	#[serde(default = "default_storage_path")]
	pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: StorageKind::default(),
			path: default_storage_path(),
		}
	}
}

/// Upper bound on lessons in one day, for the default and per-shift settings.
pub const MAX_LESSONS_PER_DAY: u8 = 12;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
	#[serde(default = "default_days_per_week")]
	pub days_per_week: u8,
	/// Lessons per day for shifts without a setting of their own
	#[serde(default = "default_lessons_per_day")]
	pub lessons_per_day: u8,
	/// Cap on lessons of one subject per class per day during generation
	#[serde(default = "default_max_same_subject")]
	pub max_same_subject_per_day: u8,
}

impl Default for ScheduleConfig {
	fn default() -> Self {
		Self {
			days_per_week: default_days_per_week(),
			lessons_per_day: default_lessons_per_day(),
			max_same_subject_per_day: default_max_same_subject(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
	/// Rebuild the prompt rows after every workload change
	#[serde(default = "default_true")]
	pub auto_rebuild: bool,
}

impl Default for PromptConfig {
	fn default() -> Self {
		Self {
			auto_rebuild: true,
		}
	}
}

fn default_name() -> String {
	"timetable".to_string()
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	5000
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_storage_path() -> Option<PathBuf> {
	Some(PathBuf::from("./data/timetable"))
}

fn default_days_per_week() -> u8 {
	5
}

fn default_lessons_per_day() -> u8 {
	6
}

fn default_max_same_subject() -> u8 {
	2
}

fn default_true() -> bool {
	true
}
