//! The prompt table: class → subject → teachers.
//!
//! Rows are derived from class loads and teacher assignments and regenerated
//! wholesale for a shift on every rebuild. `has_subgroups` is always
//! recomputed from the distinct teachers of the `(shift, class, subject)`
//! tuple; nothing is carried over from the previous rows.

use crate::data::SchoolData;
use crate::error::{CoreError, Result};
use crate::service::SchoolService;
use chrono::Utc;
use std::collections::BTreeMap;
use timetable_types::{
	ClassId, PromptClassSubject, PromptEntry, PromptEntryTeacher, PromptTeacher, RebuildSummary,
	ShiftId, SubjectId, TeacherId,
};
use tracing::{debug, info};

/// Derives the prompt rows of a shift from the authoritative tables.
///
/// A load without any assigned teacher yields no row. Two assignments of the
/// same teacher (which the catalog normally rejects) are merged so they
/// count once towards the subgroup rule.
pub fn build_rows(data: &SchoolData, shift_id: ShiftId) -> Vec<PromptClassSubject> {
	let mut rows = Vec::new();

	for load in data.class_loads.values() {
		if !data.load_applies_to(load, shift_id) {
			continue;
		}

		let mut teachers: BTreeMap<TeacherId, PromptTeacher> = BTreeMap::new();
		for assignment in data.assignments.values().filter(|a| {
			a.shift_id == shift_id && a.class_id == load.class_id && a.subject_id == load.subject_id
		}) {
			teachers
				.entry(assignment.teacher_id)
				.and_modify(|t| {
					t.hours_per_week += assignment.hours_per_week;
					t.default_room_id = t.default_room_id.or(assignment.default_room_id);
				})
				.or_insert_with(|| PromptTeacher {
					teacher_id: assignment.teacher_id,
					hours_per_week: assignment.hours_per_week,
					default_room_id: assignment.default_room_id,
					is_assigned_to_class: data
						.class_teachers
						.contains(&(assignment.teacher_id, load.class_id)),
				});
		}

		if teachers.is_empty() {
			debug!(
				"No teachers for class {} subject {} in shift {}",
				load.class_id, load.subject_id, shift_id
			);
			continue;
		}

		rows.push(PromptClassSubject {
			shift_id,
			class_id: load.class_id,
			subject_id: load.subject_id,
			total_hours_per_week: load.hours_per_week,
			has_subgroups: teachers.len() >= 2,
			teachers: teachers.into_values().collect(),
		});
	}

	rows
}

/// Replaces the stored rows of a shift with freshly derived ones.
pub fn rebuild_in(data: &mut SchoolData, shift_id: ShiftId) -> RebuildSummary {
	let rows = build_rows(data, shift_id);
	let summary = RebuildSummary {
		shift_id,
		rows: rows.len(),
		rows_with_subgroups: rows.iter().filter(|r| r.has_subgroups).count(),
		built_at: Utc::now(),
	};
	data.prompt.insert(shift_id, rows);
	summary
}

/// Resolves a stored row against the catalog. Rows whose class or subject
/// no longer exists are skipped.
fn to_entry(data: &SchoolData, row: &PromptClassSubject, ids_only: bool) -> Option<PromptEntry> {
	let class = data.classes.get(&row.class_id)?;
	let subject = data.subjects.get(&row.subject_id)?;

	let teachers = row
		.teachers
		.iter()
		.map(|t| PromptEntryTeacher {
			teacher_id: t.teacher_id,
			teacher_name: if ids_only {
				None
			} else {
				data.teachers.get(&t.teacher_id).map(|x| x.full_name.clone())
			},
			hours_per_week: t.hours_per_week,
			default_room_id: t.default_room_id,
			is_assigned_to_class: t.is_assigned_to_class,
		})
		.collect();

	Some(PromptEntry {
		class_id: class.id,
		class_name: (!ids_only).then(|| class.name.clone()),
		subject_id: subject.id,
		subject_name: (!ids_only).then(|| subject.name.clone()),
		total_hours_per_week: row.total_hours_per_week,
		has_subgroups: row.has_subgroups,
		teachers,
	})
}

impl SchoolService {
	/// Regenerates the prompt rows of a shift.
	pub async fn rebuild_prompt(&self, shift_id: ShiftId) -> Result<RebuildSummary> {
		let summary = self
			.store
			.update(|data| {
				data.shift(shift_id)?;
				Ok(rebuild_in(data, shift_id))
			})
			.await?;

		info!(
			"Prompt rebuilt for shift {}: {} rows, {} with subgroups",
			shift_id, summary.rows, summary.rows_with_subgroups
		);
		Ok(summary)
	}

	/// Stored prompt rows of a shift, resolved for presentation.
	pub async fn prompt_structure(&self, shift_id: ShiftId, ids_only: bool) -> Result<Vec<PromptEntry>> {
		self.store
			.read(|data| {
				data.shift(shift_id)?;
				Ok(data
					.prompt
					.get(&shift_id)
					.map(|rows| rows.iter().filter_map(|row| to_entry(data, row, ids_only)).collect())
					.unwrap_or_default())
			})
			.await
	}

	/// The prompt row of one `(class, subject)` pair in a shift.
	pub async fn class_subject_info(
		&self,
		shift_id: ShiftId,
		class_id: ClassId,
		subject_id: SubjectId,
	) -> Result<PromptEntry> {
		self.store
			.read(|data| {
				data.prompt
					.get(&shift_id)
					.and_then(|rows| {
						rows.iter()
							.find(|r| r.class_id == class_id && r.subject_id == subject_id)
					})
					.and_then(|row| to_entry(data, row, false))
					.ok_or_else(|| {
						CoreError::NotFound(format!(
							"No prompt entry for class {} subject {} in shift {}",
							class_id, subject_id, shift_id
						))
					})
			})
			.await
	}
}
