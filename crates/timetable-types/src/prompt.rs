//! Rows of the prompt table used to feed schedule generation.

use crate::school::{ClassId, RoomId, ShiftId, SubjectId, TeacherId};
use serde::{Deserialize, Serialize};

/// One `(shift, class, subject)` tuple with the teachers that share it.
///
/// `has_subgroups` is derived from the distinct teacher count at rebuild
/// time: two or more teachers split the class into subgroups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptClassSubject {
	pub shift_id: ShiftId,
	pub class_id: ClassId,
	pub subject_id: SubjectId,
	pub total_hours_per_week: u32,
	pub has_subgroups: bool,
	pub teachers: Vec<PromptTeacher>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTeacher {
	pub teacher_id: TeacherId,
	pub hours_per_week: u32,
	#[serde(default)]
	pub default_room_id: Option<RoomId>,
	pub is_assigned_to_class: bool,
}

/// Prompt row resolved against the catalog for presentation.
///
/// Names are omitted when the caller asks for ids only, which keeps the
/// generated prompt compact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptEntry {
	pub class_id: ClassId,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub class_name: Option<String>,
	pub subject_id: SubjectId,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub subject_name: Option<String>,
	pub total_hours_per_week: u32,
	pub has_subgroups: bool,
	pub teachers: Vec<PromptEntryTeacher>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptEntryTeacher {
	pub teacher_id: TeacherId,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub teacher_name: Option<String>,
	pub hours_per_week: u32,
	#[serde(default)]
	pub default_room_id: Option<RoomId>,
	pub is_assigned_to_class: bool,
}
