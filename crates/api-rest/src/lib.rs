//! # API REST
//!
//! HTTP surface for the allergy insights service.
//!
//! Handles:
//! - JSON endpoints with axum (read aggregated records, append new entries)
//! - Server-rendered HTML pages
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (body parsing, status codes, CORS, request tracing)
//!
//! Uses `allergy-core` for all data operations.

#![warn(rust_2018_idioms)]

pub mod handlers;
pub mod pages;

use allergy_core::{AllergyDataSource, CoreConfig};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Path of the JSON read endpoint.
pub const ALLERGY_DATA_PATH: &str = "/data_visualization/api/allergy-data/";
/// Path of the write endpoint.
pub const POST_ALLERGY_DATA_PATH: &str = "/data_visualization/post-allergy-data/";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub data_source: Arc<AllergyDataSource>,
}

impl AppState {
    /// State backed by the store selected in `cfg`.
    pub fn from_config(cfg: Arc<CoreConfig>) -> Self {
        Self {
            data_source: Arc::new(AllergyDataSource::from_config(cfg.clone())),
            cfg,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::allergy_data, handlers::post_allergy_data),
    components(schemas(
        handlers::HealthRes,
        handlers::AllergyRes,
        handlers::AllergyEntryReq,
        handlers::StatusRes,
    ))
)]
pub struct ApiDoc;

/// Build the full router: pages, JSON API, Swagger UI and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::visualization_page))
        .route(
            "/data_visualization/allergy_visualization/",
            get(handlers::visualization_page),
        )
        .route("/data_visualization/allergies/", get(handlers::allergies_page))
        // API
        .route("/health", get(handlers::health))
        .route(ALLERGY_DATA_PATH, get(handlers::allergy_data))
        .route(POST_ALLERGY_DATA_PATH, post(handlers::post_allergy_data))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
