//! School catalog, workload and timetable entities.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ShiftId = u32;
pub type ClassId = u32;
pub type SubjectId = u32;
pub type TeacherId = u32;
pub type RoomId = u32;
pub type SubgroupId = u32;
pub type LessonId = u32;
pub type ClassLoadId = u32;
pub type AssignmentId = u32;

/// A school session grouping, e.g. the morning cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
	pub id: ShiftId,
	pub name: String,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
	pub id: ClassId,
	/// Unique class label, e.g. "5A".
	pub name: String,
}

/// Subject categories used when grouping subjects for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectCategory {
	Languages,
	Humanities,
	NaturalMath,
}

impl fmt::Display for SubjectCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SubjectCategory::Languages => write!(f, "languages"),
			SubjectCategory::Humanities => write!(f, "humanities"),
			SubjectCategory::NaturalMath => write!(f, "natural_math"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
	pub id: SubjectId,
	pub name: String,
	#[serde(default)]
	pub category: Option<SubjectCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
	pub id: TeacherId,
	pub full_name: String,
	#[serde(default)]
	pub short_name: Option<String>,
	#[serde(default)]
	pub phone: Option<String>,
}

/// A classroom. Capacity is counted in classes, not students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
	pub id: RoomId,
	pub name: String,
	/// Subject the room is equipped for, if any.
	#[serde(default)]
	pub subject_id: Option<SubjectId>,
	/// Room only hosts lessons taught to a subgroup.
	#[serde(default)]
	pub subgroups_only: bool,
	#[serde(default = "default_capacity")]
	pub max_classes_simultaneously: u32,
}

/// A split of a class taught in parallel by different teachers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgroup {
	pub id: SubgroupId,
	pub name: String,
	/// Owning class. Unscoped subgroups ("1", "2") are shared by all classes.
	#[serde(default)]
	pub class_id: Option<ClassId>,
}

/// Required weekly hours of a subject in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLoad {
	pub id: ClassLoadId,
	/// `None` applies the load to every shift the class belongs to.
	#[serde(default)]
	pub shift_id: Option<ShiftId>,
	pub class_id: ClassId,
	pub subject_id: SubjectId,
	pub hours_per_week: u32,
}

/// A teacher's share of a subject in a class for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAssignment {
	pub id: AssignmentId,
	pub shift_id: ShiftId,
	pub teacher_id: TeacherId,
	pub subject_id: SubjectId,
	pub class_id: ClassId,
	#[serde(default)]
	pub hours_per_week: u32,
	#[serde(default)]
	pub default_room_id: Option<RoomId>,
}

/// Position of a lesson in the weekly grid. Both fields are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
	pub day_of_week: u8,
	pub lesson_number: u8,
}

impl fmt::Display for Slot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "day {}, lesson {}", self.day_of_week, self.lesson_number)
	}
}

/// Number of lessons a shift holds on one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
	pub day_of_week: u8,
	/// Zero marks a day without lessons.
	pub lessons_count: u8,
}

/// A single timetable cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
	pub id: LessonId,
	pub shift_id: ShiftId,
	pub class_id: ClassId,
	pub day_of_week: u8,
	pub lesson_number: u8,
	pub subject_id: SubjectId,
	pub teacher_id: TeacherId,
	#[serde(default)]
	pub subgroup_id: Option<SubgroupId>,
	pub room_id: RoomId,
}

impl Lesson {
	pub fn slot(&self) -> Slot {
		Slot {
			day_of_week: self.day_of_week,
			lesson_number: self.lesson_number,
		}
	}
}

fn default_true() -> bool {
	true
}

fn default_capacity() -> u32 {
	1
}
