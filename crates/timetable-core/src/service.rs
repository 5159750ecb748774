//! The school service: entry point for every operation on school data.
//!
//! Operations are split by concern across `catalog`, `lessons`, `prompt`
//! and `solver`; each adds an `impl SchoolService` block.

use crate::data::SchoolData;
use crate::error::Result;
use crate::store::SchoolStore;
use timetable_config::{ScheduleConfig, StorageKind, TimetableConfig};
use timetable_storage::{create_storage, StorageBackend, StorageService};
use timetable_types::{ShiftId, Slot};
use tracing::info;

/// Bounds of the weekly timetable grid. Shifts may lower or raise the
/// lesson count of individual days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
	pub days_per_week: u8,
	pub lessons_per_day: u8,
	pub max_same_subject_per_day: u8,
}

impl Default for Grid {
	fn default() -> Self {
		Self::from(&ScheduleConfig::default())
	}
}

impl From<&ScheduleConfig> for Grid {
	fn from(config: &ScheduleConfig) -> Self {
		Self {
			days_per_week: config.days_per_week,
			lessons_per_day: config.lessons_per_day,
			max_same_subject_per_day: config.max_same_subject_per_day,
		}
	}
}

impl Grid {
	/// Lessons a shift holds on a day: its own setting for the day, else
	/// `lessons_per_day`. Days past `days_per_week` hold none.
	pub fn lessons_on(&self, data: &SchoolData, shift_id: ShiftId, day_of_week: u8) -> u8 {
		if !(1..=self.days_per_week).contains(&day_of_week) {
			return 0;
		}
		data.schedule_settings
			.get(&shift_id)
			.and_then(|days| days.get(&day_of_week))
			.copied()
			.unwrap_or(self.lessons_per_day)
	}

	pub fn contains(&self, data: &SchoolData, shift_id: ShiftId, slot: Slot) -> bool {
		slot.lesson_number >= 1 && slot.lesson_number <= self.lessons_on(data, shift_id, slot.day_of_week)
	}
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
	pub grid: Grid,
	/// Rebuild prompt rows whenever class loads or assignments change
	pub auto_rebuild: bool,
}

impl Default for ServiceOptions {
	fn default() -> Self {
		Self {
			grid: Grid::default(),
			auto_rebuild: true,
		}
	}
}

pub struct SchoolService {
	pub(crate) store: SchoolStore,
	pub(crate) options: ServiceOptions,
}

impl SchoolService {
	pub fn new(store: SchoolStore, options: ServiceOptions) -> Self {
		Self { store, options }
	}

	/// Opens the configured storage backend and loads the school snapshot.
	pub async fn from_config(config: &TimetableConfig) -> Result<Self> {
		let backend = match (config.storage.backend, &config.storage.path) {
			(StorageKind::File, Some(path)) => StorageBackend::File { path: path.clone() },
			_ => StorageBackend::Memory,
		};
		info!("Opening {:?} storage", backend);

		let store = SchoolStore::open(StorageService::new(create_storage(backend))).await?;
		let options = ServiceOptions {
			grid: Grid::from(&config.schedule),
			auto_rebuild: config.prompt.auto_rebuild,
		};

		Ok(Self::new(store, options))
	}

	/// In-memory service, used by tests and throwaway instances.
	pub async fn in_memory(options: ServiceOptions) -> Result<Self> {
		let storage = StorageService::new(create_storage(StorageBackend::Memory));
		Ok(Self::new(SchoolStore::open(storage).await?, options))
	}

	pub fn options(&self) -> &ServiceOptions {
		&self.options
	}
}
