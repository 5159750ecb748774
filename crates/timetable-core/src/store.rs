//! Snapshot persistence for [`SchoolData`].

use crate::data::SchoolData;
use crate::error::Result;
use chrono::Utc;
use timetable_storage::StorageService;
use tokio::sync::RwLock;
use tracing::{debug, info};

const NAMESPACE: &str = "school";
const SNAPSHOT_ID: &str = "data";

/// Holds the school data in memory and writes it through to storage.
///
/// Mutations run against a copy under the write lock. The copy replaces the
/// live data only after it has been persisted, so a failed write leaves
/// readers with the previous state.
pub struct SchoolStore {
	storage: StorageService,
	data: RwLock<SchoolData>,
}

impl SchoolStore {
	/// Loads the snapshot from storage, starting empty when none exists.
	pub async fn open(storage: StorageService) -> Result<Self> {
		let data = match storage
			.retrieve_optional::<SchoolData>(NAMESPACE, SNAPSHOT_ID)
			.await?
		{
			Some(data) => {
				info!(
					"Loaded school snapshot: {} classes, {} teachers, {} lessons",
					data.classes.len(),
					data.teachers.len(),
					data.lessons.len()
				);
				data
			}
			None => {
				info!("No school snapshot found, starting empty");
				SchoolData::default()
			}
		};

		Ok(Self {
			storage,
			data: RwLock::new(data),
		})
	}

	pub async fn read<T>(&self, f: impl FnOnce(&SchoolData) -> T) -> T {
		let data = self.data.read().await;
		f(&data)
	}

	/// Applies `f` transactionally: either the whole change is persisted and
	/// published, or nothing changes.
	pub async fn update<T>(&self, f: impl FnOnce(&mut SchoolData) -> Result<T>) -> Result<T> {
		let mut guard = self.data.write().await;
		let mut draft = guard.clone();

		let value = f(&mut draft)?;
		if draft == *guard {
			return Ok(value);
		}

		draft.updated_at = Some(Utc::now());
		self.storage.store(NAMESPACE, SNAPSHOT_ID, &draft).await?;
		*guard = draft;
		debug!("School snapshot persisted");

		Ok(value)
	}
}
