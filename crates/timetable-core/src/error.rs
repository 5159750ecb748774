// timetable-core/src/error.rs

use thiserror::Error;
use timetable_storage::StorageError;

#[derive(Error, Debug)]
pub enum CoreError {
	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Validation(String),

	/// One or more scheduling rules would be broken. All violations are
	/// reported together.
	#[error("{}", .0.join("; "))]
	Conflict(Vec<String>),

	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

impl CoreError {
	pub fn not_found(kind: &str, id: u32) -> Self {
		CoreError::NotFound(format!("{} with ID {} not found", kind, id))
	}

	pub fn conflict(message: impl Into<String>) -> Self {
		CoreError::Conflict(vec![message.into()])
	}
}

pub type Result<T> = std::result::Result<T, CoreError>;
