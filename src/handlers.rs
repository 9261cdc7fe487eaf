use crate::catalog::CatalogOptions;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::services::WorkerService;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Query/write interface over the worker collection.
    pub workers: WorkerService,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-workers-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/workers
///
/// Lists workers with search, role filter, sorting and pagination.
#[utoipa::path(
    get,
    path = "/api/workers",
    params(ListWorkersParams),
    responses(
        (status = 200, description = "One page of workers", body = WorkerPage),
        (status = 400, description = "Malformed query parameters", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_workers(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListWorkersParams>, QueryRejection>,
) -> Result<Json<WorkerPage>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    tracing::info!("GET /api/workers - params: {:?}", params);

    let page = state.workers.list(&params).await?;
    Ok(Json(page))
}

/// POST /api/workers
///
/// Registers a new worker from a submitted draft.
#[utoipa::path(
    post,
    path = "/api/workers",
    request_body = WorkerDraft,
    responses(
        (status = 201, description = "Worker registered", body = WorkerRecord),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn create_worker(
    State(state): State<Arc<AppState>>,
    draft: Result<Json<WorkerDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkerRecord>), AppError> {
    let Json(draft) = draft.map_err(|e| AppError::Validation(e.body_text()))?;
    tracing::info!("POST /api/workers - {:?} ({:?})", draft.name, draft.role);

    let record = state.workers.create(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/workers/:id
#[utoipa::path(
    get,
    path = "/api/workers/{id}",
    params(("id" = String, Path, description = "Worker identity")),
    responses(
        (status = 200, description = "The worker", body = WorkerRecord),
        (status = 404, description = "Unknown worker", body = ErrorBody)
    )
)]
pub async fn get_worker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkerRecord>, AppError> {
    tracing::info!("GET /api/workers/{}", id);

    let record = state.workers.get(&id).await?;
    Ok(Json(record))
}

/// PATCH /api/workers/:id
///
/// Applies a partial update. Name, role, location and salary must still be
/// present in the body.
#[utoipa::path(
    patch,
    path = "/api/workers/{id}",
    params(("id" = String, Path, description = "Worker identity")),
    request_body = WorkerDraft,
    responses(
        (status = 200, description = "The updated worker", body = WorkerRecord),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "Unknown worker", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn update_worker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    patch: Result<Json<WorkerPatch>, JsonRejection>,
) -> Result<Json<WorkerRecord>, AppError> {
    let Json(patch) = patch.map_err(|e| AppError::Validation(e.body_text()))?;
    tracing::info!("PATCH /api/workers/{}", id);

    let record = state.workers.update(&id, patch).await?;
    Ok(Json(record))
}

/// GET /api/catalog/options
///
/// Every option set a worker record can carry, for form rendering.
#[utoipa::path(
    get,
    path = "/api/catalog/options",
    responses((status = 200, description = "Option sets", body = CatalogOptions))
)]
pub async fn catalog_options() -> Json<CatalogOptions> {
    Json(CatalogOptions::current())
}
