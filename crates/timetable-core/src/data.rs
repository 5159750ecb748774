//! The persisted school snapshot.

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use timetable_types::{
	AssignmentId, ClassGroup, ClassId, ClassLoad, ClassLoadId, Lesson, LessonId,
	PromptClassSubject, Room, RoomId, Shift, ShiftId, Subgroup, SubgroupId, Subject, SubjectId,
	Teacher, TeacherAssignment, TeacherId,
};

/// Every table of one school.
///
/// Ids come from a single `sequence` shared by all tables, so an id is never
/// reused after a delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolData {
	#[serde(default)]
	pub sequence: u32,
	#[serde(default)]
	pub shifts: BTreeMap<ShiftId, Shift>,
	#[serde(default)]
	pub classes: BTreeMap<ClassId, ClassGroup>,
	/// `(shift, class)` enrolment
	#[serde(default)]
	pub shift_classes: BTreeSet<(ShiftId, ClassId)>,
	#[serde(default)]
	pub subjects: BTreeMap<SubjectId, Subject>,
	#[serde(default)]
	pub teachers: BTreeMap<TeacherId, Teacher>,
	/// `(teacher, class)` links of teachers attached to a class
	#[serde(default)]
	pub class_teachers: BTreeSet<(TeacherId, ClassId)>,
	#[serde(default)]
	pub rooms: BTreeMap<RoomId, Room>,
	#[serde(default)]
	pub subgroups: BTreeMap<SubgroupId, Subgroup>,
	#[serde(default)]
	pub class_loads: BTreeMap<ClassLoadId, ClassLoad>,
	#[serde(default)]
	pub assignments: BTreeMap<AssignmentId, TeacherAssignment>,
	#[serde(default)]
	pub lessons: BTreeMap<LessonId, Lesson>,
	/// Lessons per weekday of a shift, where they differ from the default
	#[serde(default)]
	pub schedule_settings: BTreeMap<ShiftId, BTreeMap<u8, u8>>,
	/// Prompt rows per shift, regenerated wholesale on rebuild
	#[serde(default)]
	pub prompt: BTreeMap<ShiftId, Vec<PromptClassSubject>>,
	#[serde(default)]
	pub updated_at: Option<DateTime<Utc>>,
}

impl SchoolData {
	pub fn next_id(&mut self) -> u32 {
		self.sequence += 1;
		self.sequence
	}

	pub fn shift(&self, id: ShiftId) -> Result<&Shift> {
		self.shifts.get(&id).ok_or_else(|| CoreError::not_found("Shift", id))
	}

	pub fn class(&self, id: ClassId) -> Result<&ClassGroup> {
		self.classes.get(&id).ok_or_else(|| CoreError::not_found("Class", id))
	}

	pub fn subject(&self, id: SubjectId) -> Result<&Subject> {
		self.subjects.get(&id).ok_or_else(|| CoreError::not_found("Subject", id))
	}

	pub fn teacher(&self, id: TeacherId) -> Result<&Teacher> {
		self.teachers.get(&id).ok_or_else(|| CoreError::not_found("Teacher", id))
	}

	pub fn room(&self, id: RoomId) -> Result<&Room> {
		self.rooms.get(&id).ok_or_else(|| CoreError::not_found("Room", id))
	}

	pub fn subgroup(&self, id: SubgroupId) -> Result<&Subgroup> {
		self.subgroups.get(&id).ok_or_else(|| CoreError::not_found("Subgroup", id))
	}

	pub fn lesson(&self, id: LessonId) -> Result<&Lesson> {
		self.lessons.get(&id).ok_or_else(|| CoreError::not_found("Lesson", id))
	}

	pub fn shifts_of_class(&self, class_id: ClassId) -> impl Iterator<Item = ShiftId> + '_ {
		self.shift_classes
			.iter()
			.filter(move |(_, c)| *c == class_id)
			.map(|(s, _)| *s)
	}

	/// Whether a class load counts towards the given shift.
	pub fn load_applies_to(&self, load: &ClassLoad, shift_id: ShiftId) -> bool {
		match load.shift_id {
			Some(id) => id == shift_id,
			None => self.shift_classes.contains(&(shift_id, load.class_id)),
		}
	}

	/// The load of `(class, subject)` that applies to the shift, if any.
	pub fn class_load_for(
		&self,
		shift_id: ShiftId,
		class_id: ClassId,
		subject_id: SubjectId,
	) -> Option<&ClassLoad> {
		self.class_loads.values().find(|load| {
			load.class_id == class_id
				&& load.subject_id == subject_id
				&& self.load_applies_to(load, shift_id)
		})
	}

	/// Shifts whose prompt rows depend on a load with this scope.
	pub fn shifts_for_load(&self, shift_id: Option<ShiftId>, class_id: ClassId) -> BTreeSet<ShiftId> {
		match shift_id {
			Some(id) => BTreeSet::from([id]),
			None => self.shifts_of_class(class_id).collect(),
		}
	}

	/// Class-scoped subgroups of a class, ordered by id.
	pub fn subgroups_of_class(&self, class_id: ClassId) -> Vec<&Subgroup> {
		self.subgroups
			.values()
			.filter(|sg| sg.class_id == Some(class_id))
			.collect()
	}
}
