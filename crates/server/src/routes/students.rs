use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::dto::StudentDto;
use service::repository::{SchoolRepository, StudentRepository};
use service::validation::{require_body, validate_new_student, validate_student_patch};
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Fragment matched case-insensitively against firstname and lastname.
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[utoipa::path(
    post, path = "/api/students", tag = "students",
    request_body = StudentDto,
    responses(
        (status = 201, description = "Created", body = StudentDto),
        (status = 400, description = "Validation Error", body = crate::errors::ErrorBody),
        (status = 404, description = "Unknown school", body = crate::errors::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorBody)
    )
)]
pub async fn create<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Json(body), _): WithRejection<Json<Option<StudentDto>>, JsonApiError>,
) -> Result<(StatusCode, Json<StudentDto>), JsonApiError> {
    let dto = require_body(body, "student")?;
    validate_new_student(&dto)?;
    let created = state.students.create(&dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/students/{id}", tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Found", body = StudentDto),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn get<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, JsonApiError>,
) -> Result<Json<StudentDto>, JsonApiError> {
    state
        .students
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("student not found with id: {}", id)))
}

#[utoipa::path(
    get, path = "/api/students/email/{email}", tag = "students",
    params(("email" = String, Path, description = "Email, matched case-insensitively")),
    responses(
        (status = 200, description = "Found", body = StudentDto),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn get_by_email<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    Path(email): Path<String>,
) -> Result<Json<StudentDto>, JsonApiError> {
    state
        .students
        .find_by_email(&email)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("student not found with email: {}", email)))
}

#[utoipa::path(
    get, path = "/api/students", tag = "students",
    responses((status = 200, description = "All students", body = [StudentDto]))
)]
pub async fn list<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
) -> Result<Json<Vec<StudentDto>>, JsonApiError> {
    let list = state.students.find_all().await?;
    info!(count = list.len(), "list students");
    Ok(Json(list))
}

#[utoipa::path(
    get, path = "/api/students/school/{school_name}", tag = "students",
    params(("school_name" = String, Path, description = "Exact school name")),
    responses((status = 200, description = "Students of the school", body = [StudentDto]))
)]
pub async fn list_by_school<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    Path(school_name): Path<String>,
) -> Result<Json<Vec<StudentDto>>, JsonApiError> {
    Ok(Json(state.students.find_by_school_name(&school_name).await?))
}

#[utoipa::path(
    get, path = "/api/students/search", tag = "students",
    params(SearchQuery),
    responses((status = 200, description = "Matching students", body = [StudentDto]))
)]
pub async fn search<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Query(q), _): WithRejection<Query<SearchQuery>, JsonApiError>,
) -> Result<Json<Vec<StudentDto>>, JsonApiError> {
    Ok(Json(state.students.search_by_name(&q.name).await?))
}

#[utoipa::path(
    get, path = "/api/students/exists", tag = "students",
    params(EmailQuery),
    responses((status = 200, description = "Whether the email is registered", body = ExistsResponse))
)]
pub async fn exists<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Query(q), _): WithRejection<Query<EmailQuery>, JsonApiError>,
) -> Result<Json<ExistsResponse>, JsonApiError> {
    let exists = state.students.exists_by_email(&q.email).await?;
    Ok(Json(ExistsResponse { exists }))
}

#[utoipa::path(
    put, path = "/api/students/{id}", tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    request_body = StudentDto,
    responses(
        (status = 200, description = "Updated", body = StudentDto),
        (status = 400, description = "Validation Error", body = crate::errors::ErrorBody),
        (status = 404, description = "Unknown student or school", body = crate::errors::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorBody)
    )
)]
pub async fn update<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, JsonApiError>,
    WithRejection(Json(body), _): WithRejection<Json<Option<StudentDto>>, JsonApiError>,
) -> Result<Json<StudentDto>, JsonApiError> {
    let dto = require_body(body, "student")?;
    validate_student_patch(&dto)?;
    Ok(Json(state.students.update(id, &dto).await?))
}

#[utoipa::path(
    delete, path = "/api/students/{id}", tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    state.students.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/students/email/{email}", tag = "students",
    params(("email" = String, Path, description = "Email, matched case-insensitively")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete_by_email<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    Path(email): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.students.delete_by_email(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}
