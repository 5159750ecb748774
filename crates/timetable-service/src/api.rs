//! HTTP API for the timetable.
//!
//! Every failure is answered with an [`ErrorResponse`]; the browser client
//! shows its `message` verbatim. Extractor rejections go through the same
//! path, so malformed JSON, paths and queries are reported the same way.

use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection, QueryRejection},
		FromRequest, FromRequestParts, OptionalFromRequest, Path, Query, Request, State,
	},
	http::{request::Parts, StatusCode},
	response::{IntoResponse, Json, Response},
	routing::{delete, get, post, put},
	Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use timetable_core::{CoreError, SchoolService};
use timetable_types::{
	AssignmentId, ClassGroup, ClassId, ClassLoad, ClassLoadId, CreateClassRequest,
	CreateLessonRequest, CreateRoomRequest, CreateShiftRequest, CreateSubgroupRequest,
	CreateSubjectRequest, CreateTeacherAssignmentRequest, CreateTeacherRequest, DaySchedule,
	ErrorResponse, GenerateScheduleRequest, GeneratedSchedule, HealthResponse, Lesson, LessonId,
	MessageResponse, PromptEntry, PromptQuery, RebuildSummary, Room, RoomId, Shift, ShiftFilter,
	ShiftId, Subgroup, Subject, SubjectId, Teacher, TeacherAssignment, TeacherId,
	UpdateLessonRequest, UpdateLessonSubjectRequest, UpdateLessonTeacherRequest, UpdateRoomRequest,
	UpdateScheduleSettingsRequest, UpdateSubjectCategoryRequest, UpdateTeacherRequest,
	UpsertClassLoadRequest,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationErrors};

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
	Core(CoreError),
	/// Request body failed field validation
	Validation(String),
	/// Request could not be decoded
	BadRequest(String),
}

impl ApiError {
	fn status_and_code(&self) -> (StatusCode, &'static str) {
		match self {
			ApiError::Core(CoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
			ApiError::Core(CoreError::Validation(_)) | ApiError::Validation(_) => {
				(StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
			}
			ApiError::Core(CoreError::Conflict(_)) => (StatusCode::CONFLICT, "CONFLICT"),
			ApiError::Core(CoreError::Storage(_)) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
			}
			ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
		}
	}

	fn message(&self) -> String {
		match self {
			ApiError::Core(e) => e.to_string(),
			ApiError::Validation(message) | ApiError::BadRequest(message) => message.clone(),
		}
	}
}

impl From<CoreError> for ApiError {
	fn from(error: CoreError) -> Self {
		ApiError::Core(error)
	}
}

impl From<ValidationErrors> for ApiError {
	fn from(errors: ValidationErrors) -> Self {
		ApiError::Validation(errors.to_string())
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::BadRequest(rejection.body_text())
	}
}

impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		ApiError::BadRequest(rejection.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		ApiError::BadRequest(rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, code) = self.status_and_code();
		let message = self.message();
		if status.is_server_error() {
			warn!("Request failed with {}: {}", code, message);
		} else {
			info!("Request rejected with {}: {}", code, message);
		}

		let body = ErrorResponse {
			error: code.to_string(),
			message,
		};
		(status, Json(body)).into_response()
	}
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// JSON body extractor that rejects with [`ApiError`].
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
		Ok(Self(value))
	}
}

/// A missing body (no `Content-Type`) extracts as `None`.
impl<S, T> OptionalFromRequest<S> for ApiJson<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
		let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
		Ok(body.map(|Json(value)| Self(value)))
	}
}

/// Path extractor that rejects with [`ApiError`].
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
		Ok(Self(value))
	}
}

/// Query extractor that rejects with [`ApiError`].
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
		Ok(Self(value))
	}
}

#[derive(Clone)]
struct AppState {
	school: Arc<SchoolService>,
	service_name: String,
}

/// Builds the API router around a school service.
pub fn router(school: Arc<SchoolService>, service_name: impl Into<String>) -> Router {
	let state = AppState {
		school,
		service_name: service_name.into(),
	};

	Router::new()
		.route("/health", get(health_check))
		// Catalog
		.route("/api/shifts", get(list_shifts).post(create_shift))
		.route("/api/shifts/{id}/classes/{class_id}", post(enrol_class))
		.route("/api/shifts/{id}/schedule", get(schedule_settings).put(update_schedule_settings))
		.route("/api/classes", get(list_classes).post(create_class))
		.route("/api/classes/{id}/subjects", get(class_subjects))
		.route("/api/classes/{id}/teachers", get(class_teachers))
		.route("/api/classes/{id}/subjects/{subject_id}/teachers", get(class_subject_teachers))
		.route("/api/subjects", get(list_subjects).post(create_subject))
		.route("/api/subjects/{id}/category", put(update_subject_category))
		.route("/api/teachers", get(list_teachers).post(create_teacher))
		.route("/api/teachers/{id}", put(update_teacher).delete(delete_teacher))
		.route("/api/teachers/{id}/classes/{class_id}", post(attach_teacher))
		.route("/api/rooms", get(list_rooms).post(create_room))
		.route("/api/rooms/{id}", put(update_room).delete(delete_room))
		.route("/api/subgroups", get(list_subgroups).post(create_subgroup))
		// Workload
		.route("/api/class-loads", get(list_class_loads).put(upsert_class_load))
		.route("/api/class-loads/{id}", delete(delete_class_load))
		.route("/api/teacher-assignments", get(list_assignments).post(create_assignment))
		.route("/api/teacher-assignments/{id}", delete(delete_assignment))
		// Timetable cells
		.route("/api/lessons", get(list_lessons).post(create_lesson))
		.route("/api/lessons/{id}", put(update_lesson).delete(delete_lesson))
		.route("/api/lessons/{id}/teacher", put(update_lesson_teacher))
		.route("/api/lessons/{id}/subject", put(update_lesson_subject))
		// Prompt table and generation
		.route("/api/prompt/{shift_id}", get(prompt_structure))
		.route("/api/prompt/{shift_id}/rebuild", post(rebuild_prompt))
		.route(
			"/api/prompt/{shift_id}/classes/{class_id}/subjects/{subject_id}",
			get(class_subject_info),
		)
		.route("/api/schedule/{shift_id}/generate", post(generate_schedule))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// API server bound to the configured address
pub struct ApiServer {
	bind_address: String,
	service_name: String,
	school: Arc<SchoolService>,
}

impl ApiServer {
	pub fn new(bind_address: String, service_name: String, school: Arc<SchoolService>) -> Self {
		Self {
			bind_address,
			service_name,
			school,
		}
	}

	/// Serves until `shutdown` resolves.
	#[instrument(skip_all, fields(address = %self.bind_address))]
	pub async fn run(self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
		let app = router(self.school, self.service_name);
		let listener = TcpListener::bind(&self.bind_address).await?;

		info!("API server listening on {}", self.bind_address);

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown)
			.await?;

		Ok(())
	}
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "healthy".to_string(),
		service: state.service_name,
		timestamp: chrono::Utc::now().timestamp(),
	})
}

async fn list_shifts(State(state): State<AppState>) -> Json<Vec<Shift>> {
	Json(state.school.list_shifts().await)
}

async fn create_shift(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateShiftRequest>,
) -> ApiResult<Shift> {
	request.validate()?;
	Ok(Json(state.school.create_shift(request).await?))
}

async fn enrol_class(
	State(state): State<AppState>,
	ApiPath((shift_id, class_id)): ApiPath<(ShiftId, ClassId)>,
) -> ApiResult<MessageResponse> {
	state.school.enrol_class(shift_id, class_id).await?;
	Ok(Json(MessageResponse::new("Class enrolled in shift")))
}

async fn schedule_settings(
	State(state): State<AppState>,
	ApiPath(shift_id): ApiPath<ShiftId>,
) -> ApiResult<Vec<DaySchedule>> {
	Ok(Json(state.school.schedule_settings(shift_id).await?))
}

async fn update_schedule_settings(
	State(state): State<AppState>,
	ApiPath(shift_id): ApiPath<ShiftId>,
	ApiJson(request): ApiJson<UpdateScheduleSettingsRequest>,
) -> ApiResult<Vec<DaySchedule>> {
	request.validate()?;
	Ok(Json(state.school.set_schedule_settings(shift_id, request).await?))
}

async fn list_classes(
	State(state): State<AppState>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> Json<Vec<ClassGroup>> {
	Json(state.school.list_classes(filter.shift).await)
}

async fn create_class(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateClassRequest>,
) -> ApiResult<ClassGroup> {
	request.validate()?;
	Ok(Json(state.school.create_class(request).await?))
}

async fn class_subjects(
	State(state): State<AppState>,
	ApiPath(class_id): ApiPath<ClassId>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> ApiResult<Vec<Subject>> {
	Ok(Json(state.school.class_subjects(class_id, filter.shift).await?))
}

async fn class_teachers(
	State(state): State<AppState>,
	ApiPath(class_id): ApiPath<ClassId>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> ApiResult<Vec<Teacher>> {
	Ok(Json(state.school.class_teachers(class_id, None, filter.shift).await?))
}

async fn class_subject_teachers(
	State(state): State<AppState>,
	ApiPath((class_id, subject_id)): ApiPath<(ClassId, SubjectId)>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> ApiResult<Vec<Teacher>> {
	Ok(Json(
		state
			.school
			.class_teachers(class_id, Some(subject_id), filter.shift)
			.await?,
	))
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<Subject>> {
	Json(state.school.list_subjects().await)
}

async fn create_subject(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateSubjectRequest>,
) -> ApiResult<Subject> {
	request.validate()?;
	Ok(Json(state.school.create_subject(request).await?))
}

async fn update_subject_category(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<SubjectId>,
	ApiJson(request): ApiJson<UpdateSubjectCategoryRequest>,
) -> ApiResult<Subject> {
	Ok(Json(state.school.set_subject_category(id, request).await?))
}

async fn list_teachers(State(state): State<AppState>) -> Json<Vec<Teacher>> {
	Json(state.school.list_teachers().await)
}

async fn create_teacher(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateTeacherRequest>,
) -> ApiResult<Teacher> {
	request.validate()?;
	Ok(Json(state.school.create_teacher(request).await?))
}

async fn update_teacher(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<TeacherId>,
	ApiJson(request): ApiJson<UpdateTeacherRequest>,
) -> ApiResult<Teacher> {
	request.validate()?;
	Ok(Json(state.school.update_teacher(id, request).await?))
}

async fn delete_teacher(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<TeacherId>,
) -> ApiResult<MessageResponse> {
	state.school.delete_teacher(id).await?;
	Ok(Json(MessageResponse::with_id("Teacher deleted", id)))
}

async fn attach_teacher(
	State(state): State<AppState>,
	ApiPath((teacher_id, class_id)): ApiPath<(TeacherId, ClassId)>,
) -> ApiResult<MessageResponse> {
	state.school.attach_teacher_to_class(teacher_id, class_id).await?;
	Ok(Json(MessageResponse::new("Teacher attached to class")))
}

async fn list_rooms(State(state): State<AppState>) -> Json<Vec<Room>> {
	Json(state.school.list_rooms().await)
}

async fn create_room(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateRoomRequest>,
) -> ApiResult<Room> {
	request.validate()?;
	Ok(Json(state.school.create_room(request).await?))
}

async fn update_room(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<RoomId>,
	ApiJson(request): ApiJson<UpdateRoomRequest>,
) -> ApiResult<Room> {
	request.validate()?;
	Ok(Json(state.school.update_room(id, request).await?))
}

async fn delete_room(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<RoomId>,
) -> ApiResult<MessageResponse> {
	state.school.delete_room(id).await?;
	Ok(Json(MessageResponse::with_id("Room deleted", id)))
}

async fn list_subgroups(State(state): State<AppState>) -> Json<Vec<Subgroup>> {
	Json(state.school.list_subgroups().await)
}

async fn create_subgroup(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateSubgroupRequest>,
) -> ApiResult<Subgroup> {
	request.validate()?;
	Ok(Json(state.school.create_subgroup(request).await?))
}

async fn list_class_loads(
	State(state): State<AppState>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> Json<Vec<ClassLoad>> {
	Json(state.school.list_class_loads(filter.shift).await)
}

async fn upsert_class_load(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<UpsertClassLoadRequest>,
) -> ApiResult<MessageResponse> {
	request.validate()?;
	let response = match state.school.upsert_class_load(request).await? {
		Some(load) => MessageResponse::with_id("Class load saved", load.id),
		None => MessageResponse::new("Class load removed"),
	};
	Ok(Json(response))
}

async fn delete_class_load(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<ClassLoadId>,
) -> ApiResult<MessageResponse> {
	state.school.delete_class_load(id).await?;
	Ok(Json(MessageResponse::with_id("Class load deleted", id)))
}

async fn list_assignments(
	State(state): State<AppState>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> Json<Vec<TeacherAssignment>> {
	Json(state.school.list_assignments(filter.shift).await)
}

async fn create_assignment(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateTeacherAssignmentRequest>,
) -> ApiResult<TeacherAssignment> {
	request.validate()?;
	Ok(Json(state.school.create_assignment(request).await?))
}

async fn delete_assignment(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<AssignmentId>,
) -> ApiResult<MessageResponse> {
	state.school.delete_assignment(id).await?;
	Ok(Json(MessageResponse::with_id("Assignment deleted", id)))
}

async fn list_lessons(
	State(state): State<AppState>,
	ApiQuery(filter): ApiQuery<ShiftFilter>,
) -> Json<Vec<Lesson>> {
	Json(state.school.list_lessons(filter.shift).await)
}

async fn create_lesson(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateLessonRequest>,
) -> ApiResult<Lesson> {
	request.validate()?;
	Ok(Json(state.school.create_lesson(request).await?))
}

async fn update_lesson(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<LessonId>,
	ApiJson(request): ApiJson<UpdateLessonRequest>,
) -> ApiResult<Lesson> {
	request.validate()?;
	Ok(Json(state.school.update_lesson(id, request).await?))
}

async fn delete_lesson(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<LessonId>,
) -> ApiResult<MessageResponse> {
	state.school.delete_lesson(id).await?;
	Ok(Json(MessageResponse::with_id("Lesson deleted", id)))
}

async fn update_lesson_teacher(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<LessonId>,
	ApiJson(request): ApiJson<UpdateLessonTeacherRequest>,
) -> ApiResult<Lesson> {
	Ok(Json(state.school.set_lesson_teacher(id, request.teacher_id).await?))
}

async fn update_lesson_subject(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<LessonId>,
	ApiJson(request): ApiJson<UpdateLessonSubjectRequest>,
) -> ApiResult<Lesson> {
	Ok(Json(state.school.set_lesson_subject(id, request.subject_id).await?))
}

async fn prompt_structure(
	State(state): State<AppState>,
	ApiPath(shift_id): ApiPath<ShiftId>,
	ApiQuery(query): ApiQuery<PromptQuery>,
) -> ApiResult<Vec<PromptEntry>> {
	Ok(Json(state.school.prompt_structure(shift_id, query.ids_only).await?))
}

async fn rebuild_prompt(
	State(state): State<AppState>,
	ApiPath(shift_id): ApiPath<ShiftId>,
) -> ApiResult<RebuildSummary> {
	Ok(Json(state.school.rebuild_prompt(shift_id).await?))
}

async fn class_subject_info(
	State(state): State<AppState>,
	ApiPath((shift_id, class_id, subject_id)): ApiPath<(ShiftId, ClassId, SubjectId)>,
) -> ApiResult<PromptEntry> {
	Ok(Json(
		state
			.school
			.class_subject_info(shift_id, class_id, subject_id)
			.await?,
	))
}

/// An empty body means a dry run that keeps existing lessons.
async fn generate_schedule(
	State(state): State<AppState>,
	ApiPath(shift_id): ApiPath<ShiftId>,
	body: Option<ApiJson<GenerateScheduleRequest>>,
) -> ApiResult<GeneratedSchedule> {
	let request = body.map(|ApiJson(request)| request).unwrap_or_default();
	Ok(Json(state.school.generate_schedule(shift_id, request).await?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::{to_bytes, Body};
	use axum::http::{header, Method, Request as HttpRequest};
	use async_trait::async_trait;
	use serde_json::{json, Value};
	use timetable_core::{SchoolStore, ServiceOptions};
	use timetable_storage::{StorageError, StorageInterface, StorageService};
	use tower::ServiceExt;

	/// Backend that holds no snapshot and refuses every write.
	struct FullDisk;

	#[async_trait]
	impl StorageInterface for FullDisk {
		async fn get_bytes(&self, _key: &str) -> Result<Vec<u8>, StorageError> {
			Err(StorageError::NotFound)
		}

		async fn set_bytes(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
			Err(StorageError::Backend("disk full".to_string()))
		}
	}

	async fn app() -> Router {
		let school = SchoolService::in_memory(ServiceOptions::default()).await.unwrap();
		router(Arc::new(school), "timetable-test")
	}

	async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let mut builder = HttpRequest::builder().method(method).uri(uri);
		let body = match body {
			Some(value) => {
				builder = builder.header(header::CONTENT_TYPE, "application/json");
				Body::from(value.to_string())
			}
			None => Body::empty(),
		};

		let response = app
			.clone()
			.oneshot(builder.body(body).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, value)
	}

	/// Shift, class, subject, teacher, room and a 3-hour load, returning ids.
	async fn seed(app: &Router) -> (u64, u64, u64, u64, u64) {
		let (_, shift) = call(app, Method::POST, "/api/shifts", Some(json!({"name": "Morning"}))).await;
		let shift = shift["id"].as_u64().unwrap();
		let (_, class) = call(
			app,
			Method::POST,
			"/api/classes",
			Some(json!({"name": "5A", "shift_id": shift})),
		)
		.await;
		let class = class["id"].as_u64().unwrap();
		let (_, subject) = call(app, Method::POST, "/api/subjects", Some(json!({"name": "Math"}))).await;
		let subject = subject["id"].as_u64().unwrap();
		let (_, teacher) = call(
			app,
			Method::POST,
			"/api/teachers",
			Some(json!({"full_name": "Maria Ivanova"})),
		)
		.await;
		let teacher = teacher["id"].as_u64().unwrap();
		let (_, room) = call(
			app,
			Method::POST,
			"/api/rooms",
			Some(json!({"name": "12", "subject_id": subject})),
		)
		.await;
		let room = room["id"].as_u64().unwrap();
		let (status, _) = call(
			app,
			Method::PUT,
			"/api/class-loads",
			Some(json!({"class_id": class, "subject_id": subject, "hours_per_week": 3})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		(shift, class, subject, teacher, room)
	}

	#[tokio::test]
	async fn test_health() {
		let app = app().await;
		let (status, body) = call(&app, Method::GET, "/health", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "healthy");
		assert_eq!(body["service"], "timetable-test");
	}

	#[tokio::test]
	async fn test_lesson_lifecycle() {
		let app = app().await;
		let (shift, class, subject, teacher, room) = seed(&app).await;

		let (status, lesson) = call(
			&app,
			Method::POST,
			"/api/lessons",
			Some(json!({
				"shift_id": shift,
				"class_id": class,
				"day_of_week": 1,
				"lesson_number": 2,
				"subject_id": subject,
				"teacher_id": teacher,
				"room_id": room
			})),
		)
		.await;
		assert_eq!(status, StatusCode::OK, "{}", lesson);
		let id = lesson["id"].as_u64().unwrap();

		let (status, _) = call(
			&app,
			Method::POST,
			"/api/subgroups",
			Some(json!({"name": "5A-1", "class_id": class})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (status, updated) = call(
			&app,
			Method::PUT,
			&format!("/api/lessons/{}", id),
			Some(json!({
				"subject_id": subject,
				"teacher_id": teacher,
				"subgroup_id": null,
				"room_id": room
			})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["lesson_number"], 2);

		let (status, _) = call(
			&app,
			Method::PUT,
			&format!("/api/lessons/{}/teacher", id),
			Some(json!({"teacher_id": teacher})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (status, body) = call(&app, Method::DELETE, &format!("/api/lessons/{}", id), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["message"], "Lesson deleted");

		let (status, body) = call(&app, Method::DELETE, &format!("/api/lessons/{}", id), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "NOT_FOUND");
		assert_eq!(body["message"], format!("Lesson with ID {} not found", id));
	}

	#[tokio::test]
	async fn test_conflict_reports_message() {
		let app = app().await;
		let (shift, class, subject, teacher, room) = seed(&app).await;
		let lesson = json!({
			"shift_id": shift,
			"class_id": class,
			"day_of_week": 3,
			"lesson_number": 1,
			"subject_id": subject,
			"teacher_id": teacher,
			"room_id": room
		});

		let (status, _) = call(&app, Method::POST, "/api/lessons", Some(lesson.clone())).await;
		assert_eq!(status, StatusCode::OK);

		let (status, body) = call(&app, Method::POST, "/api/lessons", Some(lesson)).await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["error"], "CONFLICT");
		assert!(body["message"]
			.as_str()
			.unwrap()
			.contains("Teacher already has a lesson at day 3, lesson 1"));
	}

	#[tokio::test]
	async fn test_malformed_requests_carry_message() {
		let app = app().await;

		let (status, body) = call(&app, Method::PUT, "/api/lessons/1/subject", Some(json!({"subject": 1}))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "BAD_REQUEST");
		assert!(body["message"].is_string());

		let (status, body) = call(&app, Method::DELETE, "/api/lessons/abc", None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body["message"].is_string());

		let (status, body) = call(&app, Method::POST, "/api/subgroups", Some(json!({"name": ""}))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
		assert!(body["message"].is_string());
	}

	#[tokio::test]
	async fn test_prompt_and_generation() {
		let app = app().await;
		let (shift, class, subject, teacher, _) = seed(&app).await;

		let (status, _) = call(
			&app,
			Method::POST,
			"/api/teacher-assignments",
			Some(json!({
				"shift_id": shift,
				"teacher_id": teacher,
				"subject_id": subject,
				"class_id": class,
				"hours_per_week": 3
			})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (status, summary) =
			call(&app, Method::POST, &format!("/api/prompt/{}/rebuild", shift), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(summary["rows"], 1);
		assert_eq!(summary["rows_with_subgroups"], 0);

		let (_, rows) = call(&app, Method::GET, &format!("/api/prompt/{}?ids_only=true", shift), None).await;
		assert_eq!(rows[0]["has_subgroups"], false);
		assert!(rows[0].get("class_name").is_none());

		let (status, info) = call(
			&app,
			Method::GET,
			&format!("/api/prompt/{}/classes/{}/subjects/{}", shift, class, subject),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(info["class_name"], "5A");
		assert_eq!(info["teachers"][0]["teacher_name"], "Maria Ivanova");

		let (status, schedule) = call(
			&app,
			Method::POST,
			&format!("/api/schedule/{}/generate", shift),
			Some(json!({"apply": true})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(schedule["suggestions"].as_array().unwrap().len(), 3);
		assert_eq!(schedule["applied"].as_array().unwrap().len(), 3);

		let (_, lessons) = call(&app, Method::GET, &format!("/api/lessons?shift={}", shift), None).await;
		assert_eq!(lessons.as_array().unwrap().len(), 3);
	}

	#[tokio::test]
	async fn test_teacher_in_use_cannot_be_deleted() {
		let app = app().await;
		let (shift, class, subject, teacher, _) = seed(&app).await;
		call(
			&app,
			Method::POST,
			"/api/teacher-assignments",
			Some(json!({
				"shift_id": shift,
				"teacher_id": teacher,
				"subject_id": subject,
				"class_id": class
			})),
		)
		.await;

		let (status, body) = call(&app, Method::DELETE, &format!("/api/teachers/{}", teacher), None).await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["message"], "Teacher has 1 assignment(s)");
	}

	#[tokio::test]
	async fn test_storage_failure_is_internal_error() {
		let store = SchoolStore::open(StorageService::new(Box::new(FullDisk))).await.unwrap();
		let school = SchoolService::new(store, ServiceOptions::default());
		let app = router(Arc::new(school), "timetable-test");

		let (status, body) = call(&app, Method::POST, "/api/shifts", Some(json!({"name": "Morning"}))).await;
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body["error"], "STORAGE_ERROR");
		assert_eq!(body["message"], "Storage error: Backend error: disk full");

		let (_, shifts) = call(&app, Method::GET, "/api/shifts", None).await;
		assert_eq!(shifts, json!([]));
	}

	#[tokio::test]
	async fn test_lesson_subject_change() {
		let app = app().await;
		let (shift, class, subject, teacher, room) = seed(&app).await;
		let (_, lesson) = call(
			&app,
			Method::POST,
			"/api/lessons",
			Some(json!({
				"shift_id": shift,
				"class_id": class,
				"day_of_week": 2,
				"lesson_number": 1,
				"subject_id": subject,
				"teacher_id": teacher,
				"room_id": room
			})),
		)
		.await;
		let id = lesson["id"].as_u64().unwrap();

		let (_, physics) = call(&app, Method::POST, "/api/subjects", Some(json!({"name": "Physics"}))).await;
		let physics = physics["id"].as_u64().unwrap();
		let (status, _) = call(
			&app,
			Method::PUT,
			"/api/class-loads",
			Some(json!({"class_id": class, "subject_id": physics, "hours_per_week": 2})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (status, updated) = call(
			&app,
			Method::PUT,
			&format!("/api/lessons/{}/subject", id),
			Some(json!({"subject_id": physics})),
		)
		.await;
		assert_eq!(status, StatusCode::OK, "{}", updated);
		assert_eq!(updated["subject_id"], physics);
		assert_eq!(updated["teacher_id"], teacher);
		assert_eq!(updated["day_of_week"], 2);
	}

	#[tokio::test]
	async fn test_schedule_settings_endpoints() {
		let app = app().await;
		let (shift, ..) = seed(&app).await;
		let uri = format!("/api/shifts/{}/schedule", shift);

		let (status, week) = call(&app, Method::GET, &uri, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(week.as_array().unwrap().len(), 5);
		assert_eq!(week[0], json!({"day_of_week": 1, "lessons_count": 6}));

		let (status, week) = call(
			&app,
			Method::PUT,
			&uri,
			Some(json!({"days": [{"day_of_week": 5, "lessons_count": 4}]})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(week[4]["lessons_count"], 4);

		let (status, body) = call(
			&app,
			Method::PUT,
			&uri,
			Some(json!({"days": [{"day_of_week": 1, "lessons_count": 13}]})),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");

		let (status, _) = call(&app, Method::PUT, &uri, Some(json!({"days": []}))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_catalog_updates_and_class_dropdowns() {
		let app = app().await;
		let (shift, class, subject, teacher, room) = seed(&app).await;
		call(
			&app,
			Method::POST,
			"/api/teacher-assignments",
			Some(json!({
				"shift_id": shift,
				"teacher_id": teacher,
				"subject_id": subject,
				"class_id": class,
				"hours_per_week": 3,
				"default_room_id": room
			})),
		)
		.await;

		let (status, subjects) = call(&app, Method::GET, &format!("/api/classes/{}/subjects", class), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(subjects[0]["name"], "Math");
		let (_, teachers) = call(
			&app,
			Method::GET,
			&format!("/api/classes/{}/subjects/{}/teachers?shift={}", class, subject, shift),
			None,
		)
		.await;
		assert_eq!(teachers.as_array().unwrap().len(), 1);
		let (_, teachers) = call(&app, Method::GET, &format!("/api/classes/{}/teachers", class), None).await;
		assert_eq!(teachers[0]["full_name"], "Maria Ivanova");

		let (status, renamed) = call(
			&app,
			Method::PUT,
			&format!("/api/teachers/{}", teacher),
			Some(json!({"full_name": "Maria Petrova", "short_name": "M.P."})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(renamed["full_name"], "Maria Petrova");

		let (status, categorised) = call(
			&app,
			Method::PUT,
			&format!("/api/subjects/{}/category", subject),
			Some(json!({"category": "natural_math"})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(categorised["category"], "natural_math");

		let (status, updated) = call(
			&app,
			Method::PUT,
			&format!("/api/rooms/{}", room),
			Some(json!({"max_classes_simultaneously": 2})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["max_classes_simultaneously"], 2);
		assert_eq!(updated["subgroups_only"], false);

		let (status, body) = call(&app, Method::DELETE, &format!("/api/rooms/{}", room), None).await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["message"], "Room '12' is the default room of 1 assignment(s)");

		let (_, spare) = call(&app, Method::POST, "/api/rooms", Some(json!({"name": "40"}))).await;
		let spare = spare["id"].as_u64().unwrap();
		let (status, body) = call(&app, Method::DELETE, &format!("/api/rooms/{}", spare), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["message"], "Room deleted");
		let (status, _) = call(&app, Method::DELETE, &format!("/api/rooms/{}", spare), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}
}
