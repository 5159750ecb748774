//! Catalog and workload tables: shifts, classes, subjects, teachers, rooms,
//! subgroups, class loads and teacher assignments.

use crate::data::SchoolData;
use crate::error::{CoreError, Result};
use crate::prompt::rebuild_in;
use crate::service::{Grid, SchoolService};
use std::collections::BTreeSet;
use timetable_config::MAX_LESSONS_PER_DAY;
use timetable_types::{
	AssignmentId, ClassGroup, ClassId, ClassLoad, ClassLoadId, CreateClassRequest,
	CreateRoomRequest, CreateShiftRequest, CreateSubgroupRequest, CreateSubjectRequest,
	CreateTeacherAssignmentRequest, CreateTeacherRequest, DaySchedule, Room, RoomId, Shift,
	ShiftId, Subgroup, Subject, SubjectId, Teacher, TeacherAssignment, TeacherId,
	UpdateRoomRequest, UpdateScheduleSettingsRequest, UpdateSubjectCategoryRequest,
	UpdateTeacherRequest, UpsertClassLoadRequest,
};
use tracing::{debug, info};

/// Rebuilds the prompt rows of every listed shift that still exists.
fn refresh_prompt(data: &mut SchoolData, enabled: bool, shifts: BTreeSet<ShiftId>) {
	if !enabled {
		return;
	}
	for shift_id in shifts {
		if data.shifts.contains_key(&shift_id) {
			let summary = rebuild_in(data, shift_id);
			debug!("Auto-rebuilt prompt for shift {}: {} rows", shift_id, summary.rows);
		}
	}
}

fn trimmed(value: &str, field: &str) -> Result<String> {
	let value = value.trim();
	if value.is_empty() {
		return Err(CoreError::Validation(format!("{} must not be empty", field)));
	}
	Ok(value.to_string())
}

fn week_of(data: &SchoolData, shift_id: ShiftId, grid: &Grid) -> Vec<DaySchedule> {
	(1..=grid.days_per_week)
		.map(|day| DaySchedule {
			day_of_week: day,
			lessons_count: grid.lessons_on(data, shift_id, day),
		})
		.collect()
}

impl SchoolService {
	pub async fn list_shifts(&self) -> Vec<Shift> {
		self.store.read(|data| data.shifts.values().cloned().collect()).await
	}

	pub async fn create_shift(&self, request: CreateShiftRequest) -> Result<Shift> {
		let name = trimmed(&request.name, "Shift name")?;
		let shift = self
			.store
			.update(|data| {
				if data.shifts.values().any(|s| s.name == name) {
					return Err(CoreError::conflict(format!("Shift '{}' already exists", name)));
				}
				let id = data.next_id();
				let shift = Shift {
					id,
					name,
					is_active: true,
				};
				data.shifts.insert(id, shift.clone());
				Ok(shift)
			})
			.await?;

		info!("Created shift {} ({})", shift.id, shift.name);
		Ok(shift)
	}

	/// Lesson count of every day of the week for a shift.
	pub async fn schedule_settings(&self, shift_id: ShiftId) -> Result<Vec<DaySchedule>> {
		let grid = self.options.grid;
		self.store
			.read(|data| {
				data.shift(shift_id)?;
				Ok(week_of(data, shift_id, &grid))
			})
			.await
	}

	/// Sets the lesson count of the listed days. Returns the whole week.
	pub async fn set_schedule_settings(
		&self,
		shift_id: ShiftId,
		request: UpdateScheduleSettingsRequest,
	) -> Result<Vec<DaySchedule>> {
		let grid = self.options.grid;
		for day in &request.days {
			if !(1..=grid.days_per_week).contains(&day.day_of_week) {
				return Err(CoreError::Validation(format!(
					"day_of_week must be between 1 and {}, got {}",
					grid.days_per_week, day.day_of_week
				)));
			}
			if day.lessons_count > MAX_LESSONS_PER_DAY {
				return Err(CoreError::Validation(format!(
					"lessons_count must be at most {}, got {}",
					MAX_LESSONS_PER_DAY, day.lessons_count
				)));
			}
		}

		let week = self
			.store
			.update(|data| {
				data.shift(shift_id)?;
				let days = data.schedule_settings.entry(shift_id).or_default();
				for day in &request.days {
					days.insert(day.day_of_week, day.lessons_count);
				}
				Ok(week_of(data, shift_id, &grid))
			})
			.await?;

		info!("Updated schedule settings of shift {}", shift_id);
		Ok(week)
	}

	/// Classes ordered by id, optionally only those enrolled in a shift.
	pub async fn list_classes(&self, shift_id: Option<ShiftId>) -> Vec<ClassGroup> {
		self.store
			.read(|data| {
				data.classes
					.values()
					.filter(|c| match shift_id {
						Some(shift) => data.shift_classes.contains(&(shift, c.id)),
						None => true,
					})
					.cloned()
					.collect()
			})
			.await
	}

	pub async fn create_class(&self, request: CreateClassRequest) -> Result<ClassGroup> {
		let name = trimmed(&request.name, "Class name")?;
		let auto_rebuild = self.options.auto_rebuild;
		let class = self
			.store
			.update(|data| {
				if let Some(shift_id) = request.shift_id {
					data.shift(shift_id)?;
				}
				if data.classes.values().any(|c| c.name == name) {
					return Err(CoreError::conflict(format!("Class '{}' already exists", name)));
				}
				let id = data.next_id();
				let class = ClassGroup { id, name };
				data.classes.insert(id, class.clone());
				if let Some(shift_id) = request.shift_id {
					data.shift_classes.insert((shift_id, id));
					refresh_prompt(data, auto_rebuild, BTreeSet::from([shift_id]));
				}
				Ok(class)
			})
			.await?;

		info!("Created class {} ({})", class.id, class.name);
		Ok(class)
	}

	/// Enrols a class in a shift. Enrolling twice is a no-op.
	pub async fn enrol_class(&self, shift_id: ShiftId, class_id: ClassId) -> Result<()> {
		let auto_rebuild = self.options.auto_rebuild;
		self.store
			.update(|data| {
				data.shift(shift_id)?;
				data.class(class_id)?;
				if data.shift_classes.insert((shift_id, class_id)) {
					refresh_prompt(data, auto_rebuild, BTreeSet::from([shift_id]));
				}
				Ok(())
			})
			.await
	}

	/// Subjects with a class load in the class, optionally only loads that
	/// apply to a shift.
	pub async fn class_subjects(&self, class_id: ClassId, shift_id: Option<ShiftId>) -> Result<Vec<Subject>> {
		self.store
			.read(|data| {
				data.class(class_id)?;
				let ids: BTreeSet<SubjectId> = data
					.class_loads
					.values()
					.filter(|load| load.class_id == class_id && load.hours_per_week > 0)
					.filter(|load| shift_id.map_or(true, |shift| data.load_applies_to(load, shift)))
					.map(|load| load.subject_id)
					.collect();
				Ok(ids.iter().filter_map(|id| data.subjects.get(id).cloned()).collect())
			})
			.await
	}

	/// Teachers assigned to the class, optionally only for one subject or
	/// shift. Each teacher is listed once.
	pub async fn class_teachers(
		&self,
		class_id: ClassId,
		subject_id: Option<SubjectId>,
		shift_id: Option<ShiftId>,
	) -> Result<Vec<Teacher>> {
		self.store
			.read(|data| {
				data.class(class_id)?;
				if let Some(subject_id) = subject_id {
					data.subject(subject_id)?;
				}
				let ids: BTreeSet<TeacherId> = data
					.assignments
					.values()
					.filter(|a| a.class_id == class_id)
					.filter(|a| subject_id.map_or(true, |subject| a.subject_id == subject))
					.filter(|a| shift_id.map_or(true, |shift| a.shift_id == shift))
					.map(|a| a.teacher_id)
					.collect();
				Ok(ids.iter().filter_map(|id| data.teachers.get(id).cloned()).collect())
			})
			.await
	}

	pub async fn list_subjects(&self) -> Vec<Subject> {
		self.store.read(|data| data.subjects.values().cloned().collect()).await
	}

	pub async fn create_subject(&self, request: CreateSubjectRequest) -> Result<Subject> {
		let name = trimmed(&request.name, "Subject name")?;
		let subject = self
			.store
			.update(|data| {
				if data.subjects.values().any(|s| s.name == name) {
					return Err(CoreError::conflict(format!("Subject '{}' already exists", name)));
				}
				let id = data.next_id();
				let subject = Subject {
					id,
					name,
					category: request.category,
				};
				data.subjects.insert(id, subject.clone());
				Ok(subject)
			})
			.await?;

		info!("Created subject {} ({})", subject.id, subject.name);
		Ok(subject)
	}

	pub async fn set_subject_category(
		&self,
		subject_id: SubjectId,
		request: UpdateSubjectCategoryRequest,
	) -> Result<Subject> {
		let subject = self
			.store
			.update(|data| {
				let subject = data
					.subjects
					.get_mut(&subject_id)
					.ok_or_else(|| CoreError::not_found("Subject", subject_id))?;
				subject.category = request.category;
				Ok(subject.clone())
			})
			.await?;

		info!("Subject {} category set to {:?}", subject.id, subject.category);
		Ok(subject)
	}

	pub async fn list_teachers(&self) -> Vec<Teacher> {
		self.store.read(|data| data.teachers.values().cloned().collect()).await
	}

	pub async fn create_teacher(&self, request: CreateTeacherRequest) -> Result<Teacher> {
		let full_name = trimmed(&request.full_name, "Teacher name")?;
		let teacher = self
			.store
			.update(|data| {
				if data.teachers.values().any(|t| t.full_name == full_name) {
					return Err(CoreError::conflict(format!(
						"Teacher '{}' already exists",
						full_name
					)));
				}
				let id = data.next_id();
				let teacher = Teacher {
					id,
					full_name,
					short_name: request.short_name.filter(|s| !s.trim().is_empty()),
					phone: request.phone.filter(|s| !s.trim().is_empty()),
				};
				data.teachers.insert(id, teacher.clone());
				Ok(teacher)
			})
			.await?;

		info!("Created teacher {} ({})", teacher.id, teacher.full_name);
		Ok(teacher)
	}

	pub async fn update_teacher(&self, teacher_id: TeacherId, request: UpdateTeacherRequest) -> Result<Teacher> {
		let full_name = trimmed(&request.full_name, "Teacher name")?;
		let teacher = self
			.store
			.update(|data| {
				data.teacher(teacher_id)?;
				if data
					.teachers
					.values()
					.any(|t| t.id != teacher_id && t.full_name == full_name)
				{
					return Err(CoreError::conflict(format!(
						"Teacher '{}' already exists",
						full_name
					)));
				}
				let teacher = Teacher {
					id: teacher_id,
					full_name,
					short_name: request.short_name.filter(|s| !s.trim().is_empty()),
					phone: request.phone.filter(|s| !s.trim().is_empty()),
				};
				data.teachers.insert(teacher_id, teacher.clone());
				Ok(teacher)
			})
			.await?;

		info!("Updated teacher {} ({})", teacher.id, teacher.full_name);
		Ok(teacher)
	}

	/// Deletes a teacher that no lesson or assignment refers to.
	pub async fn delete_teacher(&self, teacher_id: TeacherId) -> Result<()> {
		self.store
			.update(|data| {
				data.teacher(teacher_id)?;

				let lessons = data.lessons.values().filter(|l| l.teacher_id == teacher_id).count();
				let assignments = data
					.assignments
					.values()
					.filter(|a| a.teacher_id == teacher_id)
					.count();

				let mut reasons = Vec::new();
				if lessons > 0 {
					reasons.push(format!("Teacher is used in {} lesson(s)", lessons));
				}
				if assignments > 0 {
					reasons.push(format!("Teacher has {} assignment(s)", assignments));
				}
				if !reasons.is_empty() {
					return Err(CoreError::Conflict(reasons));
				}

				data.teachers.remove(&teacher_id);
				data.class_teachers.retain(|(t, _)| *t != teacher_id);
				Ok(())
			})
			.await?;

		info!("Deleted teacher {}", teacher_id);
		Ok(())
	}

	/// Attaches a teacher to a class. The link marks the teacher's prompt
	/// entries for that class as assigned.
	pub async fn attach_teacher_to_class(&self, teacher_id: TeacherId, class_id: ClassId) -> Result<()> {
		let auto_rebuild = self.options.auto_rebuild;
		self.store
			.update(|data| {
				data.teacher(teacher_id)?;
				data.class(class_id)?;
				if data.class_teachers.insert((teacher_id, class_id)) {
					let shifts = data
						.assignments
						.values()
						.filter(|a| a.teacher_id == teacher_id && a.class_id == class_id)
						.map(|a| a.shift_id)
						.collect();
					refresh_prompt(data, auto_rebuild, shifts);
				}
				Ok(())
			})
			.await
	}

	pub async fn list_rooms(&self) -> Vec<Room> {
		self.store.read(|data| data.rooms.values().cloned().collect()).await
	}

	pub async fn create_room(&self, request: CreateRoomRequest) -> Result<Room> {
		let name = trimmed(&request.name, "Room name")?;
		if request.max_classes_simultaneously == 0 {
			return Err(CoreError::Validation(
				"max_classes_simultaneously must be at least 1".to_string(),
			));
		}

		let room = self
			.store
			.update(|data| {
				if let Some(subject_id) = request.subject_id {
					data.subject(subject_id)?;
				}
				if data
					.rooms
					.values()
					.any(|r| r.name == name && r.subject_id == request.subject_id)
				{
					return Err(CoreError::conflict(format!("Room '{}' already exists", name)));
				}
				let id = data.next_id();
				let room = Room {
					id,
					name,
					subject_id: request.subject_id,
					subgroups_only: request.subgroups_only,
					max_classes_simultaneously: request.max_classes_simultaneously,
				};
				data.rooms.insert(id, room.clone());
				Ok(room)
			})
			.await?;

		info!("Created room {} ({})", room.id, room.name);
		Ok(room)
	}

	/// Changes the subgroup restriction or capacity of a room. Lessons
	/// already placed are not re-checked.
	pub async fn update_room(&self, room_id: RoomId, request: UpdateRoomRequest) -> Result<Room> {
		if request.max_classes_simultaneously == Some(0) {
			return Err(CoreError::Validation(
				"max_classes_simultaneously must be at least 1".to_string(),
			));
		}

		let room = self
			.store
			.update(|data| {
				let room = data
					.rooms
					.get_mut(&room_id)
					.ok_or_else(|| CoreError::not_found("Room", room_id))?;
				if let Some(subgroups_only) = request.subgroups_only {
					room.subgroups_only = subgroups_only;
				}
				if let Some(capacity) = request.max_classes_simultaneously {
					room.max_classes_simultaneously = capacity;
				}
				Ok(room.clone())
			})
			.await?;

		info!(
			"Updated room {}: subgroups_only={}, capacity={}",
			room.id, room.subgroups_only, room.max_classes_simultaneously
		);
		Ok(room)
	}

	/// Deletes a room that no lesson or assignment refers to.
	pub async fn delete_room(&self, room_id: RoomId) -> Result<()> {
		self.store
			.update(|data| {
				let name = data.room(room_id)?.name.clone();

				let lessons = data.lessons.values().filter(|l| l.room_id == room_id).count();
				let assignments = data
					.assignments
					.values()
					.filter(|a| a.default_room_id == Some(room_id))
					.count();

				let mut reasons = Vec::new();
				if lessons > 0 {
					reasons.push(format!("Room '{}' is used in {} lesson(s)", name, lessons));
				}
				if assignments > 0 {
					reasons.push(format!(
						"Room '{}' is the default room of {} assignment(s)",
						name, assignments
					));
				}
				if !reasons.is_empty() {
					return Err(CoreError::Conflict(reasons));
				}

				data.rooms.remove(&room_id);
				Ok(())
			})
			.await?;

		info!("Deleted room {}", room_id);
		Ok(())
	}

	pub async fn list_subgroups(&self) -> Vec<Subgroup> {
		self.store.read(|data| data.subgroups.values().cloned().collect()).await
	}

	pub async fn create_subgroup(&self, request: CreateSubgroupRequest) -> Result<Subgroup> {
		let name = trimmed(&request.name, "Subgroup name")?;
		let subgroup = self
			.store
			.update(|data| {
				if let Some(class_id) = request.class_id {
					data.class(class_id)?;
				}
				if data
					.subgroups
					.values()
					.any(|sg| sg.name == name && sg.class_id == request.class_id)
				{
					return Err(CoreError::conflict(format!("Subgroup '{}' already exists", name)));
				}
				let id = data.next_id();
				let subgroup = Subgroup {
					id,
					name,
					class_id: request.class_id,
				};
				data.subgroups.insert(id, subgroup.clone());
				Ok(subgroup)
			})
			.await?;

		info!("Created subgroup {} ({})", subgroup.id, subgroup.name);
		Ok(subgroup)
	}

	/// Class loads, optionally only those that apply to a shift.
	pub async fn list_class_loads(&self, shift_id: Option<ShiftId>) -> Vec<ClassLoad> {
		self.store
			.read(|data| {
				data.class_loads
					.values()
					.filter(|load| shift_id.map_or(true, |shift| data.load_applies_to(load, shift)))
					.cloned()
					.collect()
			})
			.await
	}

	/// Sets the weekly hours of a subject in a class. Zero hours removes the
	/// load. Returns the stored load, if any remains.
	pub async fn upsert_class_load(&self, request: UpsertClassLoadRequest) -> Result<Option<ClassLoad>> {
		let auto_rebuild = self.options.auto_rebuild;
		let load = self
			.store
			.update(|data| {
				if let Some(shift_id) = request.shift_id {
					data.shift(shift_id)?;
				}
				data.class(request.class_id)?;
				data.subject(request.subject_id)?;

				let existing = data
					.class_loads
					.values()
					.find(|l| l.class_id == request.class_id && l.subject_id == request.subject_id)
					.cloned();

				let mut affected = data.shifts_for_load(request.shift_id, request.class_id);
				if let Some(old) = &existing {
					affected.extend(data.shifts_for_load(old.shift_id, old.class_id));
				}

				let stored = if request.hours_per_week == 0 {
					if let Some(old) = &existing {
						data.class_loads.remove(&old.id);
					}
					None
				} else {
					let id = match &existing {
						Some(old) => old.id,
						None => data.next_id(),
					};
					let load = ClassLoad {
						id,
						shift_id: request.shift_id,
						class_id: request.class_id,
						subject_id: request.subject_id,
						hours_per_week: request.hours_per_week,
					};
					data.class_loads.insert(id, load.clone());
					Some(load)
				};

				refresh_prompt(data, auto_rebuild, affected);
				Ok(stored)
			})
			.await?;

		info!(
			"Class load for class {} subject {} set to {} hours",
			request.class_id, request.subject_id, request.hours_per_week
		);
		Ok(load)
	}

	pub async fn delete_class_load(&self, load_id: ClassLoadId) -> Result<()> {
		let auto_rebuild = self.options.auto_rebuild;
		self.store
			.update(|data| {
				let load = data
					.class_loads
					.remove(&load_id)
					.ok_or_else(|| CoreError::not_found("Class load", load_id))?;
				let affected = data.shifts_for_load(load.shift_id, load.class_id);
				refresh_prompt(data, auto_rebuild, affected);
				Ok(())
			})
			.await?;

		info!("Deleted class load {}", load_id);
		Ok(())
	}

	/// Teacher assignments, optionally only those of a shift.
	pub async fn list_assignments(&self, shift_id: Option<ShiftId>) -> Vec<TeacherAssignment> {
		self.store
			.read(|data| {
				data.assignments
					.values()
					.filter(|a| shift_id.map_or(true, |shift| a.shift_id == shift))
					.cloned()
					.collect()
			})
			.await
	}

	pub async fn create_assignment(
		&self,
		request: CreateTeacherAssignmentRequest,
	) -> Result<TeacherAssignment> {
		let auto_rebuild = self.options.auto_rebuild;
		let assignment = self
			.store
			.update(|data| {
				data.shift(request.shift_id)?;
				data.teacher(request.teacher_id)?;
				data.subject(request.subject_id)?;
				data.class(request.class_id)?;
				if let Some(room_id) = request.default_room_id {
					data.room(room_id)?;
				}

				if data.assignments.values().any(|a| {
					a.shift_id == request.shift_id
						&& a.teacher_id == request.teacher_id
						&& a.subject_id == request.subject_id
						&& a.class_id == request.class_id
				}) {
					return Err(CoreError::conflict(
						"Teacher is already assigned to this subject in this class",
					));
				}

				let id = data.next_id();
				let assignment = TeacherAssignment {
					id,
					shift_id: request.shift_id,
					teacher_id: request.teacher_id,
					subject_id: request.subject_id,
					class_id: request.class_id,
					hours_per_week: request.hours_per_week,
					default_room_id: request.default_room_id,
				};
				data.assignments.insert(id, assignment.clone());
				refresh_prompt(data, auto_rebuild, BTreeSet::from([request.shift_id]));
				Ok(assignment)
			})
			.await?;

		info!(
			"Assigned teacher {} to subject {} in class {} (shift {})",
			assignment.teacher_id, assignment.subject_id, assignment.class_id, assignment.shift_id
		);
		Ok(assignment)
	}

	pub async fn delete_assignment(&self, assignment_id: AssignmentId) -> Result<()> {
		let auto_rebuild = self.options.auto_rebuild;
		self.store
			.update(|data| {
				let assignment = data
					.assignments
					.remove(&assignment_id)
					.ok_or_else(|| CoreError::not_found("Assignment", assignment_id))?;
				refresh_prompt(data, auto_rebuild, BTreeSet::from([assignment.shift_id]));
				Ok(())
			})
			.await?;

		info!("Deleted assignment {}", assignment_id);
		Ok(())
	}
}
