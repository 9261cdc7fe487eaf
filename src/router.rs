//! Route table and OpenAPI document.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, AppState};

/// Request bodies larger than this are refused before deserialization.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_workers,
        handlers::create_worker,
        handlers::get_worker,
        handlers::update_worker,
        handlers::catalog_options,
    ),
    components(schemas(
        crate::models::WorkerRecord,
        crate::models::Location,
        crate::models::Salary,
        crate::models::Documents,
        crate::models::WorkerDraft,
        crate::models::SalaryInput,
        crate::models::WorkerPage,
        crate::models::ErrorBody,
        crate::catalog::Role,
        crate::catalog::Language,
        crate::catalog::SalaryType,
        crate::catalog::Availability,
        crate::catalog::CatalogOptions,
    )),
    tags((name = "workers", description = "Domestic worker catalog"))
)]
pub struct ApiDoc;

/// Builds the application router with tracing, CORS and body-size layers.
///
/// Rate limiting needs the peer address and is added by the binary.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/workers",
            get(handlers::list_workers).post(handlers::create_worker),
        )
        .route(
            "/api/workers/:id",
            get(handlers::get_worker).patch(handlers::update_worker),
        )
        .route("/api/catalog/options", get(handlers::catalog_options))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable CORS origin {:?}", origin);
            layer
        }
    }
}
