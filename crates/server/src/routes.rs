pub mod schools;
pub mod students;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::{metrics, types::Health};
use service::repository::{SchoolRepository, StudentRepository};

use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_text() -> (StatusCode, String) {
    metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router over the given repositories.
pub fn build_router<S, R>(state: AppState<S, R>, cors: CorsLayer) -> Router
where
    S: StudentRepository + 'static,
    R: SchoolRepository + 'static,
{
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/api-docs/openapi.json", get(openapi_json));

    let student_routes = Router::new()
        .route("/api/students", post(students::create::<S, R>).get(students::list::<S, R>))
        .route("/api/students/search", get(students::search::<S, R>))
        .route("/api/students/exists", get(students::exists::<S, R>))
        .route(
            "/api/students/email/:email",
            get(students::get_by_email::<S, R>).delete(students::delete_by_email::<S, R>),
        )
        .route("/api/students/school/:school_name", get(students::list_by_school::<S, R>))
        .route(
            "/api/students/:id",
            get(students::get::<S, R>)
                .put(students::update::<S, R>)
                .delete(students::delete::<S, R>),
        );

    let school_routes = Router::new()
        .route("/api/schools", post(schools::create::<S, R>).get(schools::list::<S, R>))
        .route("/api/schools/name/:name", get(schools::get_by_name::<S, R>))
        .route("/api/schools/:id", get(schools::get::<S, R>).delete(schools::delete::<S, R>))
        .route("/api/schools/:id/students/count", get(schools::count_students::<S, R>));

    public
        .merge(student_routes)
        .merge(school_routes)
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_http))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // One INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // Status code and latency on the way out
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
