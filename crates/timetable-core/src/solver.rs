//! Greedy schedule generation.
//!
//! Every teacher row of the prompt table contributes one placement task per
//! weekly hour still missing from the timetable. Tasks are placed in
//! priority order into the first slot, scanning days then lesson numbers,
//! where the teacher, the class and a room are all available.

use crate::data::SchoolData;
use crate::error::{CoreError, Result};
use crate::lessons::validate_lesson;
use crate::prompt::build_rows;
use crate::service::{Grid, SchoolService};
use std::collections::{BTreeSet, HashMap, HashSet};
use timetable_types::{
	ClassId, GenerateScheduleRequest, GeneratedSchedule, Lesson, PromptClassSubject, PromptTeacher,
	RoomId, ShiftId, Slot, Subgroup, SubgroupId, SubjectId, SuggestedLesson, TeacherId,
};
use tracing::{debug, info, warn};

/// The part of a class a lesson is taught to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
	WholeClass,
	Subgroup(SubgroupId),
	/// Class subgroup for a teacher position that does not exist yet
	NewSubgroup(usize),
}

impl Group {
	fn of_lesson(lesson: &Lesson) -> Self {
		lesson.subgroup_id.map_or(Group::WholeClass, Group::Subgroup)
	}

	/// The group a row's teacher at `ordinal` teaches.
	fn of_row(data: &SchoolData, row: &PromptClassSubject, ordinal: usize) -> Self {
		if !row.has_subgroups {
			return Group::WholeClass;
		}
		find_subgroup(data, row.class_id, ordinal).map_or(Group::NewSubgroup(ordinal), Group::Subgroup)
	}
}

struct Task<'a> {
	row: &'a PromptClassSubject,
	teacher: &'a PromptTeacher,
	group: Group,
	rooms: Vec<RoomId>,
	priority: f64,
}

/// Subgroup rows first, then tasks with fewer room options, then subjects
/// with more weekly hours.
fn priority(row: &PromptClassSubject, rooms: &[RoomId]) -> f64 {
	let mut priority = 0.0;
	if row.has_subgroups {
		priority += 1000.0;
	}
	if !rooms.is_empty() {
		priority += 100.0 / rooms.len() as f64;
	}
	priority + f64::from(row.total_hours_per_week) * 10.0
}

/// The teacher's default room, otherwise every room bound to the subject.
fn candidate_rooms(data: &SchoolData, row: &PromptClassSubject, teacher: &PromptTeacher) -> Vec<RoomId> {
	let usable = |room_id: &RoomId| {
		data.rooms
			.get(room_id)
			.is_some_and(|room| row.has_subgroups || !room.subgroups_only)
	};

	if let Some(room_id) = teacher.default_room_id.filter(|id| data.rooms.contains_key(id)) {
		return [room_id].into_iter().filter(usable).collect();
	}

	data.rooms
		.values()
		.filter(|room| room.subject_id == Some(row.subject_id))
		.map(|room| room.id)
		.filter(usable)
		.collect()
}

/// Who and what occupies each slot of the shift.
#[derive(Default)]
struct Occupancy {
	teachers: HashSet<(TeacherId, Slot)>,
	classes: HashMap<(ClassId, Slot), Vec<(SubjectId, Group)>>,
	rooms: HashMap<(RoomId, Slot), BTreeSet<ClassId>>,
	/// Lesson numbers taken by a subject in a class on a day
	subject_days: HashMap<(ClassId, SubjectId, u8), BTreeSet<u8>>,
}

impl Occupancy {
	fn record(
		&mut self,
		class_id: ClassId,
		subject_id: SubjectId,
		group: Group,
		teacher_id: TeacherId,
		room_id: RoomId,
		slot: Slot,
	) {
		self.teachers.insert((teacher_id, slot));
		self.classes.entry((class_id, slot)).or_default().push((subject_id, group));
		self.rooms.entry((room_id, slot)).or_default().insert(class_id);
		self.subject_days
			.entry((class_id, subject_id, slot.day_of_week))
			.or_default()
			.insert(slot.lesson_number);
	}

	fn teacher_free(&self, teacher_id: TeacherId, slot: Slot) -> bool {
		!self.teachers.contains(&(teacher_id, slot))
	}

	/// An occupied class slot only takes a subgroup lesson of the same
	/// subject, and only when every occupant is another subgroup.
	fn class_accepts(&self, row: &PromptClassSubject, group: Group, slot: Slot) -> bool {
		match self.classes.get(&(row.class_id, slot)) {
			None => true,
			Some(_) if group == Group::WholeClass => false,
			Some(occupants) => occupants.iter().all(|(subject_id, other)| {
				*subject_id == row.subject_id && *other != Group::WholeClass && *other != group
			}),
		}
	}

	/// Parallel subgroup lessons share a slot, so the cap counts slots.
	fn under_daily_cap(&self, row: &PromptClassSubject, slot: Slot, cap: u8) -> bool {
		match self.subject_days.get(&(row.class_id, row.subject_id, slot.day_of_week)) {
			None => cap > 0,
			Some(numbers) => numbers.contains(&slot.lesson_number) || numbers.len() < usize::from(cap),
		}
	}

	fn pick_room(&self, data: &SchoolData, rooms: &[RoomId], class_id: ClassId, slot: Slot) -> Option<RoomId> {
		rooms.iter().copied().find(|room_id| {
			let capacity = data
				.rooms
				.get(room_id)
				.map_or(0, |room| room.max_classes_simultaneously as usize);
			match self.rooms.get(&(*room_id, slot)) {
				None => capacity > 0,
				Some(classes) => classes.contains(&class_id) || classes.len() < capacity,
			}
		})
	}
}

struct Placement {
	suggestion: SuggestedLesson,
	group: Group,
}

struct Plan {
	placements: Vec<Placement>,
	warnings: Vec<String>,
	requirements: usize,
	tasks: usize,
}

/// Places the missing hours of a shift. Existing lessons of the shift are
/// kept as fixed occupancy unless `ignore_existing` is set.
fn plan(data: &SchoolData, shift_id: ShiftId, grid: &Grid, ignore_existing: bool) -> Plan {
	let rows = build_rows(data, shift_id);
	let existing: Vec<&Lesson> = if ignore_existing {
		Vec::new()
	} else {
		data.lessons.values().filter(|l| l.shift_id == shift_id).collect()
	};

	let mut occupancy = Occupancy::default();
	for lesson in &existing {
		occupancy.record(
			lesson.class_id,
			lesson.subject_id,
			Group::of_lesson(lesson),
			lesson.teacher_id,
			lesson.room_id,
			lesson.slot(),
		);
	}

	let mut tasks = Vec::new();
	for row in &rows {
		for (ordinal, teacher) in row.teachers.iter().enumerate() {
			let scheduled = existing
				.iter()
				.filter(|l| {
					l.class_id == row.class_id
						&& l.subject_id == row.subject_id
						&& l.teacher_id == teacher.teacher_id
				})
				.count() as u32;
			let rooms = candidate_rooms(data, row, teacher);
			let weight = priority(row, &rooms);
			for _ in scheduled..teacher.hours_per_week {
				tasks.push(Task {
					row,
					teacher,
					group: Group::of_row(data, row, ordinal),
					rooms: rooms.clone(),
					priority: weight,
				});
			}
		}
	}
	// Stable, so equal priorities keep the table order
	tasks.sort_by(|a, b| b.priority.total_cmp(&a.priority));

	let mut placements = Vec::new();
	let mut warnings = Vec::new();
	if rows.is_empty() {
		warnings.push("No requirements to schedule".to_string());
	}

	for task in &tasks {
		let row = task.row;
		let slots = (1..=grid.days_per_week).flat_map(|day| {
			(1..=grid.lessons_on(data, shift_id, day)).map(move |number| Slot {
				day_of_week: day,
				lesson_number: number,
			})
		});

		let placed = slots
			.filter(|slot| {
				occupancy.under_daily_cap(row, *slot, grid.max_same_subject_per_day)
					&& occupancy.teacher_free(task.teacher.teacher_id, *slot)
					&& occupancy.class_accepts(row, task.group, *slot)
			})
			.find_map(|slot| {
				occupancy
					.pick_room(data, &task.rooms, row.class_id, slot)
					.map(|room_id| (slot, room_id))
			});

		match placed {
			Some((slot, room_id)) => {
				occupancy.record(
					row.class_id,
					row.subject_id,
					task.group,
					task.teacher.teacher_id,
					room_id,
					slot,
				);
				placements.push(Placement {
					suggestion: SuggestedLesson {
						day_of_week: slot.day_of_week,
						lesson_number: slot.lesson_number,
						class_id: row.class_id,
						subject_id: row.subject_id,
						teacher_id: task.teacher.teacher_id,
						subgroup_id: match task.group {
							Group::Subgroup(id) => Some(id),
							_ => None,
						},
						room_id,
					},
					group: task.group,
				});
			}
			None => {
				let reason = if task.rooms.is_empty() { "no room available" } else { "no free slot" };
				warnings.push(format!(
					"Could not place lesson: class {}, subject {}, teacher {} ({})",
					describe(data.classes.get(&row.class_id).map(|c| c.name.as_str()), row.class_id),
					describe(data.subjects.get(&row.subject_id).map(|s| s.name.as_str()), row.subject_id),
					describe(
						data.teachers.get(&task.teacher.teacher_id).map(|t| t.full_name.as_str()),
						task.teacher.teacher_id
					),
					reason
				));
			}
		}
	}

	Plan {
		placements,
		warnings,
		requirements: rows.len(),
		tasks: tasks.len(),
	}
}

fn describe(name: Option<&str>, id: u32) -> String {
	name.map_or_else(|| format!("#{}", id), str::to_string)
}

fn subgroup_name(class_name: &str, ordinal: usize) -> String {
	format!("{}-{}", class_name, ordinal + 1)
}

fn find_subgroup(data: &SchoolData, class_id: ClassId, ordinal: usize) -> Option<SubgroupId> {
	let name = subgroup_name(&data.classes.get(&class_id)?.name, ordinal);
	data.subgroups_of_class(class_id)
		.into_iter()
		.find(|sg| sg.name == name)
		.map(|sg| sg.id)
}

/// The subgroup a new class subgroup for `ordinal` would be, under the next
/// free id. Nothing is inserted.
fn draft_subgroup(data: &SchoolData, class_id: ClassId, ordinal: usize) -> Option<Subgroup> {
	Some(Subgroup {
		id: data.sequence + 1,
		name: subgroup_name(&data.classes.get(&class_id)?.name, ordinal),
		class_id: Some(class_id),
	})
}

impl SchoolService {
	/// Proposes placements for the missing hours of a shift and, when asked,
	/// writes them as lessons.
	pub async fn generate_schedule(
		&self,
		shift_id: ShiftId,
		request: GenerateScheduleRequest,
	) -> Result<GeneratedSchedule> {
		let grid = self.options.grid;

		let schedule = if request.apply {
			self.store
				.update(|data| {
					data.shift(shift_id)?;
					if request.clear_existing {
						let before = data.lessons.len();
						data.lessons.retain(|_, l| l.shift_id != shift_id);
						info!("Cleared {} lessons of shift {}", before - data.lessons.len(), shift_id);
					}
					let outcome = plan(data, shift_id, &grid, false);
					Ok(apply(data, shift_id, &grid, outcome))
				})
				.await?
		} else {
			self.store
				.read(|data| {
					data.shift(shift_id)?;
					let outcome = plan(data, shift_id, &grid, request.clear_existing);
					Ok::<_, CoreError>(preview(outcome))
				})
				.await?
		};

		for warning in &schedule.warnings {
			warn!("{}", warning);
		}
		info!("{}", schedule.summary);
		Ok(schedule)
	}
}

fn summary(plan: &Plan) -> String {
	format!(
		"Greedy schedule: {} requirements, placed {} of {} lessons",
		plan.requirements,
		plan.placements.len(),
		plan.tasks
	)
}

/// Suggestions only. Subgroups that do not exist yet are left unset.
fn preview(plan: Plan) -> GeneratedSchedule {
	let summary = summary(&plan);
	let suggestions = plan.placements.into_iter().map(|p| p.suggestion).collect();

	GeneratedSchedule {
		suggestions,
		warnings: plan.warnings,
		summary,
		applied: Vec::new(),
	}
}

/// Writes the placements as lessons. Each one passes the lesson validator
/// first; rejected placements are reported as warnings. A missing class
/// subgroup is created only together with the first lesson accepted for it.
fn apply(data: &mut SchoolData, shift_id: ShiftId, grid: &Grid, plan: Plan) -> GeneratedSchedule {
	let summary = summary(&plan);
	let mut warnings = plan.warnings;
	let mut suggestions = Vec::with_capacity(plan.placements.len());
	let mut applied = Vec::new();

	for placement in plan.placements {
		let mut suggestion = placement.suggestion;
		let new_subgroup = match placement.group {
			Group::NewSubgroup(ordinal) => match find_subgroup(data, suggestion.class_id, ordinal) {
				Some(id) => {
					suggestion.subgroup_id = Some(id);
					None
				}
				None => draft_subgroup(data, suggestion.class_id, ordinal),
			},
			_ => None,
		};
		if let Some(subgroup) = &new_subgroup {
			suggestion.subgroup_id = Some(subgroup.id);
		}

		let mut lesson = Lesson {
			id: 0,
			shift_id,
			class_id: suggestion.class_id,
			day_of_week: suggestion.day_of_week,
			lesson_number: suggestion.lesson_number,
			subject_id: suggestion.subject_id,
			teacher_id: suggestion.teacher_id,
			subgroup_id: suggestion.subgroup_id,
			room_id: suggestion.room_id,
		};

		// The drafted subgroup is visible to the validator only while it runs
		if let Some(subgroup) = &new_subgroup {
			data.subgroups.insert(subgroup.id, subgroup.clone());
		}
		match validate_lesson(data, &lesson, None, grid) {
			Ok(()) => {
				if let Some(subgroup) = &new_subgroup {
					data.next_id();
					debug!("Created subgroup {} for class {}", subgroup.name, lesson.class_id);
				}
				lesson.id = data.next_id();
				applied.push(lesson.id);
				data.lessons.insert(lesson.id, lesson);
			}
			Err(e) => {
				if let Some(subgroup) = &new_subgroup {
					data.subgroups.remove(&subgroup.id);
					suggestion.subgroup_id = None;
				}
				warnings.push(format!(
					"Suggestion for class {} at {} was not applied: {}",
					lesson.class_id,
					lesson.slot(),
					e
				));
			}
		}
		suggestions.push(suggestion);
	}

	debug!("Applied {} of {} suggestions", applied.len(), suggestions.len());
	GeneratedSchedule {
		suggestions,
		warnings,
		summary,
		applied,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::service::ServiceOptions;
	use timetable_types::{
		CreateClassRequest, CreateRoomRequest, CreateShiftRequest, CreateSubjectRequest,
		CreateTeacherAssignmentRequest, CreateTeacherRequest, DaySchedule,
		UpdateScheduleSettingsRequest, UpsertClassLoadRequest,
	};

	struct School {
		service: SchoolService,
		shift: ShiftId,
	}

	impl School {
		async fn new() -> Self {
			let service = SchoolService::in_memory(ServiceOptions::default()).await.unwrap();
			let shift = service
				.create_shift(CreateShiftRequest {
					name: "Morning".to_string(),
				})
				.await
				.unwrap()
				.id;
			Self { service, shift }
		}

		async fn class(&self, name: &str) -> ClassId {
			self.service
				.create_class(CreateClassRequest {
					name: name.to_string(),
					shift_id: Some(self.shift),
				})
				.await
				.unwrap()
				.id
		}

		async fn subject(&self, name: &str) -> SubjectId {
			self.service
				.create_subject(CreateSubjectRequest {
					name: name.to_string(),
					category: None,
				})
				.await
				.unwrap()
				.id
		}

		async fn teacher(&self, name: &str) -> TeacherId {
			self.service
				.create_teacher(CreateTeacherRequest {
					full_name: name.to_string(),
					short_name: None,
					phone: None,
				})
				.await
				.unwrap()
				.id
		}

		async fn room(&self, name: &str, subject: SubjectId, capacity: u32) -> RoomId {
			self.service
				.create_room(CreateRoomRequest {
					name: name.to_string(),
					subject_id: Some(subject),
					subgroups_only: false,
					max_classes_simultaneously: capacity,
				})
				.await
				.unwrap()
				.id
		}

		async fn load(&self, class: ClassId, subject: SubjectId, hours: u32) {
			self.service
				.upsert_class_load(UpsertClassLoadRequest {
					shift_id: None,
					class_id: class,
					subject_id: subject,
					hours_per_week: hours,
				})
				.await
				.unwrap();
		}

		async fn assign(&self, teacher: TeacherId, class: ClassId, subject: SubjectId, hours: u32) {
			self.service
				.create_assignment(CreateTeacherAssignmentRequest {
					shift_id: self.shift,
					teacher_id: teacher,
					subject_id: subject,
					class_id: class,
					hours_per_week: hours,
					default_room_id: None,
				})
				.await
				.unwrap();
		}

		async fn generate(&self, apply: bool, clear_existing: bool) -> GeneratedSchedule {
			self.service
				.generate_schedule(self.shift, GenerateScheduleRequest { apply, clear_existing })
				.await
				.unwrap()
		}
	}

	#[tokio::test]
	async fn test_places_all_hours_without_clashes() {
		let school = School::new().await;
		let class = school.class("5A").await;
		let math = school.subject("Math").await;
		let teacher = school.teacher("Olga Popova").await;
		school.room("14", math, 1).await;
		school.load(class, math, 5).await;
		school.assign(teacher, class, math, 5).await;

		let schedule = school.generate(false, false).await;
		assert!(schedule.warnings.is_empty(), "{:?}", schedule.warnings);
		assert_eq!(schedule.suggestions.len(), 5);
		assert_eq!(schedule.summary, "Greedy schedule: 1 requirements, placed 5 of 5 lessons");

		let slots: HashSet<_> = schedule
			.suggestions
			.iter()
			.map(|s| (s.day_of_week, s.lesson_number))
			.collect();
		assert_eq!(slots.len(), 5);

		// Two lessons a day at most: day 1 slots 1-2, day 2 slots 1-2, day 3 slot 1
		let per_day: Vec<_> = (1..=5)
			.map(|day| schedule.suggestions.iter().filter(|s| s.day_of_week == day).count())
			.collect();
		assert_eq!(per_day, vec![2, 2, 1, 0, 0]);
		assert!(school.service.list_lessons(None).await.is_empty());
	}

	#[tokio::test]
	async fn test_subgroup_rows_run_in_parallel() {
		let school = School::new().await;
		let class = school.class("6B").await;
		let english = school.subject("English").await;
		let first = school.teacher("Anna").await;
		let second = school.teacher("Boris").await;
		school.room("21", english, 1).await;
		school.room("22", english, 1).await;
		school.load(class, english, 2).await;
		school.assign(first, class, english, 2).await;
		school.assign(second, class, english, 2).await;

		let schedule = school.generate(true, false).await;
		assert!(schedule.warnings.is_empty(), "{:?}", schedule.warnings);
		assert_eq!(schedule.applied.len(), 4);

		// Both teachers share the same two slots, each with its own subgroup
		let slots: BTreeSet<_> = schedule
			.suggestions
			.iter()
			.map(|s| (s.day_of_week, s.lesson_number))
			.collect();
		assert_eq!(slots.len(), 2);

		let subgroups = school.service.list_subgroups().await;
		let names: Vec<_> = subgroups.iter().map(|sg| sg.name.as_str()).collect();
		assert_eq!(names, vec!["6B-1", "6B-2"]);
		for suggestion in &schedule.suggestions {
			let expected = if suggestion.teacher_id == first { subgroups[0].id } else { subgroups[1].id };
			assert_eq!(suggestion.subgroup_id, Some(expected));
		}

		let lessons = school.service.list_lessons(Some(school.shift)).await;
		assert_eq!(lessons.len(), 4);
	}

	#[tokio::test]
	async fn test_missing_room_becomes_warning() {
		let school = School::new().await;
		let class = school.class("7V").await;
		let art = school.subject("Art").await;
		let teacher = school.teacher("Egor").await;
		school.load(class, art, 1).await;
		school.assign(teacher, class, art, 1).await;

		let schedule = school.generate(true, false).await;
		assert!(schedule.suggestions.is_empty());
		assert_eq!(
			schedule.warnings,
			vec!["Could not place lesson: class 7V, subject Art, teacher Egor (no room available)".to_string()]
		);
		assert!(schedule.applied.is_empty());
	}

	#[tokio::test]
	async fn test_existing_lessons_reduce_and_block() {
		let school = School::new().await;
		let class = school.class("8A").await;
		let math = school.subject("Math").await;
		let teacher = school.teacher("Olga").await;
		school.room("14", math, 1).await;
		school.load(class, math, 3).await;
		school.assign(teacher, class, math, 3).await;

		let first = school.generate(true, false).await;
		assert_eq!(first.applied.len(), 3);

		// Nothing left to place
		let second = school.generate(true, false).await;
		assert!(second.suggestions.is_empty());
		assert_eq!(school.service.list_lessons(None).await.len(), 3);

		// Clearing starts over with the same deterministic result
		let third = school.generate(true, true).await;
		assert_eq!(third.suggestions, first.suggestions);
		assert_eq!(school.service.list_lessons(None).await.len(), 3);
	}

	#[tokio::test]
	async fn test_shared_teacher_is_never_double_booked() {
		let school = School::new().await;
		let a = school.class("9A").await;
		let b = school.class("9B").await;
		let physics = school.subject("Physics").await;
		let teacher = school.teacher("Ivan").await;
		school.room("Lab", physics, 2).await;
		for class in [a, b] {
			school.load(class, physics, 3).await;
			school.assign(teacher, class, physics, 3).await;
		}

		let schedule = school.generate(false, false).await;
		assert_eq!(schedule.suggestions.len(), 6);
		let slots: HashSet<_> = schedule
			.suggestions
			.iter()
			.map(|s| (s.day_of_week, s.lesson_number))
			.collect();
		assert_eq!(slots.len(), 6);
	}

	#[tokio::test]
	async fn test_empty_shift_reports_nothing_to_do() {
		let school = School::new().await;
		let schedule = school.generate(false, false).await;
		assert!(schedule.suggestions.is_empty());
		assert_eq!(schedule.warnings, vec!["No requirements to schedule".to_string()]);
	}

	#[tokio::test]
	async fn test_second_teacher_does_not_join_whole_class_lessons() {
		let school = School::new().await;
		let class = school.class("5A").await;
		let english = school.subject("English").await;
		let first = school.teacher("Anna").await;
		let second = school.teacher("Boris").await;
		school.room("31", english, 1).await;
		school.load(class, english, 4).await;
		school.assign(first, class, english, 2).await;

		let before = school.generate(true, false).await;
		assert_eq!(before.applied.len(), 2);
		assert!(before.suggestions.iter().all(|s| s.subgroup_id.is_none()));

		// The row now has subgroups, but the first two lessons still hold the whole class
		school.assign(second, class, english, 2).await;
		let after = school.generate(true, false).await;
		assert!(after.warnings.is_empty(), "{:?}", after.warnings);
		assert_eq!(after.applied.len(), 2);

		let taken: HashSet<_> = before
			.suggestions
			.iter()
			.map(|s| (s.day_of_week, s.lesson_number))
			.collect();
		assert!(after
			.suggestions
			.iter()
			.all(|s| !taken.contains(&(s.day_of_week, s.lesson_number))));

		let subgroups = school.service.list_subgroups().await;
		let names: Vec<_> = subgroups.iter().map(|sg| sg.name.as_str()).collect();
		assert_eq!(names, vec!["5A-2"]);
		let lessons = school.service.list_lessons(Some(school.shift)).await;
		assert_eq!(lessons.len(), 4);
		for subgroup in &subgroups {
			assert!(lessons.iter().any(|l| l.subgroup_id == Some(subgroup.id)));
		}
	}

	#[tokio::test]
	async fn test_day_settings_limit_the_scan() {
		let school = School::new().await;
		let class = school.class("7A").await;
		let math = school.subject("Math").await;
		let teacher = school.teacher("Olga").await;
		school.room("14", math, 1).await;
		school.load(class, math, 3).await;
		school.assign(teacher, class, math, 3).await;
		school
			.service
			.set_schedule_settings(
				school.shift,
				UpdateScheduleSettingsRequest {
					days: vec![
						DaySchedule {
							day_of_week: 1,
							lessons_count: 0,
						},
						DaySchedule {
							day_of_week: 2,
							lessons_count: 1,
						},
					],
				},
			)
			.await
			.unwrap();

		let schedule = school.generate(true, false).await;
		assert!(schedule.warnings.is_empty(), "{:?}", schedule.warnings);
		let slots: Vec<_> = schedule
			.suggestions
			.iter()
			.map(|s| (s.day_of_week, s.lesson_number))
			.collect();
		assert_eq!(slots, vec![(2, 1), (3, 1), (3, 2)]);
		assert_eq!(schedule.applied.len(), 3);
	}
}
