use service::dto::{SchoolDto, StudentDto};
use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::errors::ErrorBody;
use crate::routes::schools::CountResponse;
use crate::routes::students::ExistsResponse;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::students::create,
        crate::routes::students::get,
        crate::routes::students::get_by_email,
        crate::routes::students::list,
        crate::routes::students::list_by_school,
        crate::routes::students::search,
        crate::routes::students::exists,
        crate::routes::students::update,
        crate::routes::students::delete,
        crate::routes::students::delete_by_email,
        crate::routes::schools::create,
        crate::routes::schools::list,
        crate::routes::schools::get,
        crate::routes::schools::get_by_name,
        crate::routes::schools::count_students,
        crate::routes::schools::delete,
    ),
    components(
        schemas(
            HealthResponse,
            StudentDto,
            SchoolDto,
            ErrorBody,
            CountResponse,
            ExistsResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "students"),
        (name = "schools")
    )
)]
pub struct ApiDoc;
