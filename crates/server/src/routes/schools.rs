use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use service::dto::SchoolDto;
use service::repository::{SchoolRepository, StudentRepository};
use service::validation::{require_body, validate_new_school};
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[utoipa::path(
    post, path = "/api/schools", tag = "schools",
    request_body = SchoolDto,
    responses(
        (status = 201, description = "Created", body = SchoolDto),
        (status = 400, description = "Validation Error", body = crate::errors::ErrorBody),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorBody)
    )
)]
pub async fn create<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Json(body), _): WithRejection<Json<Option<SchoolDto>>, JsonApiError>,
) -> Result<(StatusCode, Json<SchoolDto>), JsonApiError> {
    let dto = require_body(body, "school")?;
    validate_new_school(&dto)?;
    let created = state.schools.create(&dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/schools", tag = "schools",
    responses((status = 200, description = "All schools", body = [SchoolDto]))
)]
pub async fn list<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
) -> Result<Json<Vec<SchoolDto>>, JsonApiError> {
    let list = state.schools.find_all().await?;
    info!(count = list.len(), "list schools");
    Ok(Json(list))
}

#[utoipa::path(
    get, path = "/api/schools/{id}", tag = "schools",
    params(("id" = i64, Path, description = "School id")),
    responses(
        (status = 200, description = "Found", body = SchoolDto),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn get<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, JsonApiError>,
) -> Result<Json<SchoolDto>, JsonApiError> {
    state
        .schools
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("school not found with id: {}", id)))
}

#[utoipa::path(
    get, path = "/api/schools/name/{name}", tag = "schools",
    params(("name" = String, Path, description = "Exact school name")),
    responses(
        (status = 200, description = "Found", body = SchoolDto),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn get_by_name<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    Path(name): Path<String>,
) -> Result<Json<SchoolDto>, JsonApiError> {
    state
        .schools
        .find_dto_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("school not found with name: {}", name)))
}

#[utoipa::path(
    get, path = "/api/schools/{id}/students/count", tag = "schools",
    params(("id" = i64, Path, description = "School id")),
    responses(
        (status = 200, description = "Number of enrolled students", body = CountResponse),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn count_students<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, JsonApiError>,
) -> Result<Json<CountResponse>, JsonApiError> {
    let count = state.schools.count_students(id).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    delete, path = "/api/schools/{id}", tag = "schools",
    params(("id" = i64, Path, description = "School id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody),
        (status = 409, description = "Students still enrolled", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete<S: StudentRepository, R: SchoolRepository>(
    State(state): State<AppState<S, R>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    state.schools.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
