use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Resort as exchanged over HTTP.
#[derive(ToSchema)]
pub struct ResortDoc {
    pub name: String,
    pub region: String,
    pub state: String,
    /// -90 ..= 90
    pub latitude: f64,
    /// -180 ..= 180
    pub longitude: f64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::resorts::list_resorts,
        crate::routes::resorts::create_resort,
        crate::routes::resorts::delete_resort,
        crate::routes::weather::get_weather,
    ),
    components(
        schemas(
            HealthResponse,
            ResortDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "resorts"),
        (name = "weather")
    )
)]
pub struct ApiDoc;
