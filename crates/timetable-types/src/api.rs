//! Request and response bodies of the timetable HTTP API.
//!
//! Requests derive `Validate` so handlers can reject malformed input before
//! it reaches the store. Every failure is answered with an [`ErrorResponse`]
//! whose `message` the browser client shows verbatim.

use crate::school::{
	ClassId, DaySchedule, LessonId, RoomId, ShiftId, SubgroupId, SubjectCategory, SubjectId,
	TeacherId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShiftRequest {
	#[validate(length(min = 1, max = 50))]
	pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClassRequest {
	#[validate(length(min = 1, max = 10))]
	pub name: String,
	/// Shift to enrol the new class in.
	#[serde(default)]
	pub shift_id: Option<ShiftId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubjectRequest {
	#[validate(length(min = 1, max = 100))]
	pub name: String,
	#[serde(default)]
	pub category: Option<SubjectCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTeacherRequest {
	#[validate(length(min = 1, max = 100))]
	pub full_name: String,
	#[serde(default)]
	#[validate(length(max = 30))]
	pub short_name: Option<String>,
	#[serde(default)]
	#[validate(length(max = 20))]
	pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
	#[validate(length(min = 1, max = 10))]
	pub name: String,
	#[serde(default)]
	pub subject_id: Option<SubjectId>,
	#[serde(default)]
	pub subgroups_only: bool,
	#[serde(default = "default_capacity")]
	#[validate(range(min = 1))]
	pub max_classes_simultaneously: u32,
}

/// Body of `PUT /api/teachers/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTeacherRequest {
	#[validate(length(min = 1, max = 100))]
	pub full_name: String,
	#[serde(default)]
	#[validate(length(max = 30))]
	pub short_name: Option<String>,
	#[serde(default)]
	#[validate(length(max = 20))]
	pub phone: Option<String>,
}

/// Body of `PUT /api/subjects/{id}/category`. `null` clears the category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubjectCategoryRequest {
	#[serde(default)]
	pub category: Option<SubjectCategory>,
}

/// Body of `PUT /api/rooms/{id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRoomRequest {
	#[serde(default)]
	pub subgroups_only: Option<bool>,
	#[serde(default)]
	#[validate(range(min = 1, max = 10))]
	pub max_classes_simultaneously: Option<u32>,
}

/// Body of `PUT /api/shifts/{id}/schedule`. Days not listed keep their
/// current count.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateScheduleSettingsRequest {
	#[validate(length(min = 1, max = 7))]
	pub days: Vec<DaySchedule>,
}

/// Body of `POST /api/subgroups`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubgroupRequest {
	#[validate(length(min = 1, max = 15))]
	pub name: String,
	#[serde(default)]
	pub class_id: Option<ClassId>,
}

/// Body of `POST /api/lessons`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLessonRequest {
	pub shift_id: ShiftId,
	pub class_id: ClassId,
	#[validate(range(min = 1))]
	pub day_of_week: u8,
	#[validate(range(min = 1))]
	pub lesson_number: u8,
	pub subject_id: SubjectId,
	pub teacher_id: TeacherId,
	#[serde(default)]
	pub subgroup_id: Option<SubgroupId>,
	pub room_id: RoomId,
}

/// Body of `PUT /api/lessons/{id}`. The cell position is not editable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateLessonRequest {
	pub subject_id: SubjectId,
	pub teacher_id: TeacherId,
	#[serde(default)]
	pub subgroup_id: Option<SubgroupId>,
	pub room_id: RoomId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLessonTeacherRequest {
	pub teacher_id: TeacherId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLessonSubjectRequest {
	pub subject_id: SubjectId,
}

/// Body of `PUT /api/class-loads`; upserts by `(class_id, subject_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertClassLoadRequest {
	#[serde(default)]
	pub shift_id: Option<ShiftId>,
	pub class_id: ClassId,
	pub subject_id: SubjectId,
	#[validate(range(max = 40))]
	pub hours_per_week: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTeacherAssignmentRequest {
	pub shift_id: ShiftId,
	pub teacher_id: TeacherId,
	pub subject_id: SubjectId,
	pub class_id: ClassId,
	#[serde(default)]
	#[validate(range(max = 40))]
	pub hours_per_week: u32,
	#[serde(default)]
	pub default_room_id: Option<RoomId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateScheduleRequest {
	/// Write the suggestions as lessons.
	#[serde(default)]
	pub apply: bool,
	/// Drop the shift's lessons before placing anything.
	#[serde(default)]
	pub clear_existing: bool,
}

/// `?shift=` filter for list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftFilter {
	#[serde(default)]
	pub shift: Option<ShiftId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptQuery {
	#[serde(default)]
	pub ids_only: bool,
}

/// Generic success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub id: Option<u32>,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			id: None,
		}
	}

	pub fn with_id(message: impl Into<String>, id: u32) -> Self {
		Self {
			message: message.into(),
			id: Some(id),
		}
	}
}

/// Failure body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Stable error code, e.g. `NOT_FOUND`.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildSummary {
	pub shift_id: ShiftId,
	pub rows: usize,
	pub rows_with_subgroups: usize,
	pub built_at: DateTime<Utc>,
}

/// A placement proposed by the schedule generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedLesson {
	pub day_of_week: u8,
	pub lesson_number: u8,
	pub class_id: ClassId,
	pub subject_id: SubjectId,
	pub teacher_id: TeacherId,
	/// Set when the row is taught in subgroups and the schedule was applied.
	#[serde(default)]
	pub subgroup_id: Option<SubgroupId>,
	pub room_id: RoomId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedSchedule {
	pub suggestions: Vec<SuggestedLesson>,
	pub warnings: Vec<String>,
	pub summary: String,
	/// Ids of lessons written when the request asked to apply.
	#[serde(default)]
	pub applied: Vec<LessonId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	pub service: String,
	pub timestamp: i64,
}

fn default_capacity() -> u32 {
	1
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_update_lesson_accepts_null_subgroup() {
		let body = r#"{"subject_id": 2, "teacher_id": 7, "subgroup_id": null, "room_id": 4}"#;
		let request: UpdateLessonRequest = serde_json::from_str(body).unwrap();
		assert_eq!(request.subgroup_id, None);
		assert_eq!(request.room_id, 4);
	}

	#[test]
	fn test_subgroup_name_validation() {
		let empty = CreateSubgroupRequest {
			name: String::new(),
			class_id: None,
		};
		assert!(empty.validate().is_err());

		let ok = CreateSubgroupRequest {
			name: "5A-1".to_string(),
			class_id: Some(1),
		};
		assert!(ok.validate().is_ok());
	}

	#[test]
	fn test_room_update_bounds() {
		let request: UpdateRoomRequest =
			serde_json::from_str(r#"{"max_classes_simultaneously": 11}"#).unwrap();
		assert!(request.subgroups_only.is_none());
		assert!(request.validate().is_err());
		assert!(UpdateRoomRequest::default().validate().is_ok());
	}

	#[test]
	fn test_message_response_omits_missing_id() {
		let json = serde_json::to_value(MessageResponse::new("done")).unwrap();
		assert_eq!(json, serde_json::json!({ "message": "done" }));
	}
}
