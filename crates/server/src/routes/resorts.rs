use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use common::metrics::RESORTS_REJECTED_TOTAL;
use models::{Resort, ResortCandidate};
use serde_json::Value;
use service::errors::ServiceError;
use tracing::{info, warn};

use crate::{errors::ApiError, state::AppState};

#[utoipa::path(
    get, path = "/ski-resorts", tag = "resorts",
    responses((status = 200, description = "All resorts in insertion order", body = [crate::openapi::ResortDoc]))
)]
pub async fn list_resorts(State(state): State<AppState>) -> Json<Vec<Resort>> {
    let resorts = state.resorts.list().await;
    info!(count = resorts.len(), "list resorts");
    Json(resorts)
}

#[utoipa::path(
    post, path = "/ski-resorts", tag = "resorts",
    request_body = crate::openapi::ResortDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ResortDoc),
        (status = 400, description = "Invalid resort data! / Resort already exists"),
        (status = 500, description = "Backing file could not be written")
    )
)]
pub async fn create_resort(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Resort>), ApiError> {
    let Json(value) = payload.map_err(|e| {
        RESORTS_REJECTED_TOTAL.inc();
        warn!(error = %e, "unreadable resort payload");
        ApiError::InvalidResort
    })?;
    let candidate = ResortCandidate::from_json(value).map_err(|e| {
        RESORTS_REJECTED_TOTAL.inc();
        warn!(error = %e, "resort payload is not an object");
        ServiceError::from(e)
    })?;
    let created = state.resorts.create(&candidate).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete, path = "/ski-resorts/{name}", tag = "resorts",
    params(("name" = String, Path, description = "Resort name, matched ignoring case")),
    responses(
        (status = 200, description = "Resort deleted / Resort already deleted"),
        (status = 500, description = "Backing file could not be rewritten")
    )
)]
pub async fn delete_resort(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let outcome = state.resorts.delete(&name).await?;
    Ok((StatusCode::OK, outcome.message()))
}
