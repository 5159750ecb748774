//! Timetable cells and the rules a cell must satisfy.

use crate::data::SchoolData;
use crate::error::{CoreError, Result};
use crate::service::{Grid, SchoolService};
use std::collections::BTreeSet;
use timetable_types::{
	CreateLessonRequest, Lesson, LessonId, ShiftId, SubjectId, TeacherId, UpdateLessonRequest,
};
use tracing::info;

/// Checks a lesson against the catalog and every other lesson.
///
/// `exclude` is the id of the lesson being replaced; it never conflicts with
/// itself. Missing references and out-of-grid positions fail fast, while
/// scheduling rule violations are collected into a single
/// [`CoreError::Conflict`].
pub fn validate_lesson(
	data: &SchoolData,
	lesson: &Lesson,
	exclude: Option<LessonId>,
	grid: &Grid,
) -> Result<()> {
	data.shift(lesson.shift_id)?;
	data.class(lesson.class_id)?;
	data.subject(lesson.subject_id)?;
	data.teacher(lesson.teacher_id)?;
	let room = data.room(lesson.room_id)?;

	if let Some(subgroup_id) = lesson.subgroup_id {
		let subgroup = data.subgroup(subgroup_id)?;
		if subgroup.class_id.is_some_and(|c| c != lesson.class_id) {
			return Err(CoreError::Validation(format!(
				"Subgroup '{}' belongs to another class",
				subgroup.name
			)));
		}
	}

	if !grid.contains(data, lesson.shift_id, lesson.slot()) {
		return Err(CoreError::Validation(format!(
			"Slot ({}) is outside the timetable: the shift has {} lessons on day {}",
			lesson.slot(),
			grid.lessons_on(data, lesson.shift_id, lesson.day_of_week),
			lesson.day_of_week
		)));
	}

	let others: Vec<&Lesson> = data
		.lessons
		.values()
		.filter(|l| Some(l.id) != exclude && l.shift_id == lesson.shift_id)
		.collect();
	let same_slot: Vec<&Lesson> = others
		.iter()
		.copied()
		.filter(|l| l.slot() == lesson.slot())
		.collect();

	let mut violations = Vec::new();

	if same_slot.iter().any(|l| l.teacher_id == lesson.teacher_id) {
		violations.push(format!("Teacher already has a lesson at {}", lesson.slot()));
	}

	let class_clash = same_slot.iter().filter(|l| l.class_id == lesson.class_id).any(|l| {
		match (l.subgroup_id, lesson.subgroup_id) {
			(Some(theirs), Some(ours)) => theirs == ours,
			_ => true,
		}
	});
	if class_clash {
		violations.push(format!("Class already has a lesson at {}", lesson.slot()));
	}

	if room.subgroups_only && lesson.subgroup_id.is_none() {
		violations.push(format!("Room '{}' is reserved for subgroup lessons", room.name));
	}
	let classes_in_room: BTreeSet<_> = same_slot
		.iter()
		.filter(|l| l.room_id == room.id && l.class_id != lesson.class_id)
		.map(|l| l.class_id)
		.collect();
	if classes_in_room.len() as u32 >= room.max_classes_simultaneously {
		violations.push(format!(
			"Room '{}' is full at {} ({} of {} classes)",
			room.name,
			lesson.slot(),
			classes_in_room.len(),
			room.max_classes_simultaneously
		));
	}

	if let Some(message) = hour_limit_violation(data, &others, lesson) {
		violations.push(message);
	}

	if violations.is_empty() {
		Ok(())
	} else {
		Err(CoreError::Conflict(violations))
	}
}

/// The teacher's assignment caps its own lessons; without one the class
/// load caps all lessons of the subject in the class.
fn hour_limit_violation(data: &SchoolData, others: &[&Lesson], lesson: &Lesson) -> Option<String> {
	let assignment = data.assignments.values().find(|a| {
		a.shift_id == lesson.shift_id
			&& a.class_id == lesson.class_id
			&& a.subject_id == lesson.subject_id
			&& a.teacher_id == lesson.teacher_id
	});

	let (scheduled, limit, whose) = match assignment {
		Some(a) => (
			others
				.iter()
				.filter(|l| {
					l.class_id == lesson.class_id
						&& l.subject_id == lesson.subject_id
						&& l.teacher_id == lesson.teacher_id
				})
				.count() as u32,
			a.hours_per_week,
			"teacher's assignment",
		),
		None => (
			others
				.iter()
				.filter(|l| l.class_id == lesson.class_id && l.subject_id == lesson.subject_id)
				.count() as u32,
			data.class_load_for(lesson.shift_id, lesson.class_id, lesson.subject_id)
				.map_or(0, |load| load.hours_per_week),
			"class load",
		),
	};

	(scheduled + 1 > limit).then(|| {
		format!(
			"Weekly hours exceeded: {} lessons already scheduled, {} allows {}",
			scheduled, whose, limit
		)
	})
}

impl SchoolService {
	/// Lessons ordered by id, optionally only those of a shift.
	pub async fn list_lessons(&self, shift_id: Option<ShiftId>) -> Vec<Lesson> {
		self.store
			.read(|data| {
				data.lessons
					.values()
					.filter(|l| shift_id.map_or(true, |shift| l.shift_id == shift))
					.cloned()
					.collect()
			})
			.await
	}

	pub async fn get_lesson(&self, lesson_id: LessonId) -> Result<Lesson> {
		self.store.read(|data| data.lesson(lesson_id).cloned()).await
	}

	pub async fn create_lesson(&self, request: CreateLessonRequest) -> Result<Lesson> {
		let grid = self.options.grid;
		let lesson = self
			.store
			.update(|data| {
				let mut lesson = Lesson {
					id: 0,
					shift_id: request.shift_id,
					class_id: request.class_id,
					day_of_week: request.day_of_week,
					lesson_number: request.lesson_number,
					subject_id: request.subject_id,
					teacher_id: request.teacher_id,
					subgroup_id: request.subgroup_id,
					room_id: request.room_id,
				};
				validate_lesson(data, &lesson, None, &grid)?;
				lesson.id = data.next_id();
				data.lessons.insert(lesson.id, lesson.clone());
				Ok(lesson)
			})
			.await?;

		info!(
			"Created lesson {} for class {} at {}",
			lesson.id,
			lesson.class_id,
			lesson.slot()
		);
		Ok(lesson)
	}

	/// Replaces the content of a cell. Its shift, class and position stay put.
	pub async fn update_lesson(&self, lesson_id: LessonId, request: UpdateLessonRequest) -> Result<Lesson> {
		self.modify_lesson(lesson_id, |lesson| {
			lesson.subject_id = request.subject_id;
			lesson.teacher_id = request.teacher_id;
			lesson.subgroup_id = request.subgroup_id;
			lesson.room_id = request.room_id;
		})
		.await
	}

	pub async fn set_lesson_teacher(&self, lesson_id: LessonId, teacher_id: TeacherId) -> Result<Lesson> {
		self.modify_lesson(lesson_id, |lesson| lesson.teacher_id = teacher_id)
			.await
	}

	pub async fn set_lesson_subject(&self, lesson_id: LessonId, subject_id: SubjectId) -> Result<Lesson> {
		self.modify_lesson(lesson_id, |lesson| lesson.subject_id = subject_id)
			.await
	}

	pub async fn delete_lesson(&self, lesson_id: LessonId) -> Result<()> {
		self.store
			.update(|data| {
				data.lessons
					.remove(&lesson_id)
					.map(|_| ())
					.ok_or_else(|| CoreError::not_found("Lesson", lesson_id))
			})
			.await?;

		info!("Deleted lesson {}", lesson_id);
		Ok(())
	}

	async fn modify_lesson(&self, lesson_id: LessonId, edit: impl FnOnce(&mut Lesson)) -> Result<Lesson> {
		let grid = self.options.grid;
		let lesson = self
			.store
			.update(|data| {
				let mut lesson = data.lesson(lesson_id)?.clone();
				edit(&mut lesson);
				validate_lesson(data, &lesson, Some(lesson_id), &grid)?;
				data.lessons.insert(lesson_id, lesson.clone());
				Ok(lesson)
			})
			.await?;

		info!("Updated lesson {}", lesson_id);
		Ok(lesson)
	}
}
