//! Request handlers.
//!
//! Handlers translate HTTP input into data source calls and map `CoreError`s onto status codes.
//! Error detail is logged; clients only see a short plain-text message.

use crate::pages;
use crate::AppState;
use allergy_core::{build_entry, summarise, CoreError, NewAllergyEntry, ParsedAllergy};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One aggregated allergy record.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllergyRes {
    /// Sequence number, starting at 1.
    pub s_number: usize,
    /// Category name, or `Other` for pooled small categories.
    pub category: String,
    pub criticality: String,
    /// Cleaned allergen label.
    pub specific_reason: String,
}

impl From<ParsedAllergy> for AllergyRes {
    fn from(p: ParsedAllergy) -> Self {
        Self {
            s_number: p.s_number,
            category: p.category,
            criticality: p.criticality,
            specific_reason: p.specific_reason,
        }
    }
}

/// Body of the write endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AllergyEntryReq {
    /// Allergen label. Required.
    pub specific_reason: Option<String>,
    /// Defaults to `unknown`.
    pub category: Option<String>,
    /// Defaults to `unknown`.
    pub criticality: Option<String>,
    /// Patient id; defaults to `unknown`.
    pub patient: Option<String>,
    /// Practitioner id; defaults to `unknown`.
    pub recorder: Option<String>,
}

impl From<AllergyEntryReq> for NewAllergyEntry {
    fn from(req: AllergyEntryReq) -> Self {
        Self {
            specific_reason: req.specific_reason,
            category: req.category,
            criticality: req.criticality,
            patient: req.patient,
            recorder: req.recorder,
        }
    }
}

/// Write endpoint response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusRes {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Allergy insights API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/data_visualization/api/allergy-data/",
    responses(
        (status = 200, description = "Aggregated allergy records", body = [AllergyRes])
    )
)]
/// Aggregated allergy records as JSON.
///
/// Always succeeds: a missing or unreadable backing file yields an empty list.
#[axum::debug_handler]
pub async fn allergy_data(State(state): State<AppState>) -> Json<Vec<AllergyRes>> {
    let allergies = state.data_source.allergies();
    tracing::debug!("serving {} allergy records", allergies.len());
    Json(allergies.into_iter().map(AllergyRes::from).collect())
}

#[utoipa::path(
    post,
    path = "/data_visualization/post-allergy-data/",
    request_body = AllergyEntryReq,
    responses(
        (status = 201, description = "Entry appended", body = StatusRes),
        (status = 400, description = "Invalid JSON, missing specific_reason, or backing file not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Append a new allergy entry to the backing bundle.
///
/// The body is parsed here rather than with the `Json` extractor so every malformed body gets
/// the same plain-text `Invalid JSON` response.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not a JSON object with string fields,
/// - `specific_reason` is missing or blank,
/// - the backing file does not exist.
///
/// Returns `500 Internal Server Error` if the bundle cannot be read or written.
#[axum::debug_handler]
pub async fn post_allergy_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<StatusRes>), (StatusCode, &'static str)> {
    let req: AllergyEntryReq = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("rejecting allergy entry body: {}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid JSON"));
        }
    };

    let entry = match build_entry(req.into()) {
        Ok(entry) => entry,
        Err(CoreError::MissingField(field)) => {
            tracing::warn!("rejecting allergy entry: missing {}", field);
            return Err((StatusCode::BAD_REQUEST, "specific_reason is required"));
        }
        Err(e) => {
            tracing::error!("Build entry error: {:?}", e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
        }
    };

    match state.data_source.append(entry) {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(StatusRes {
                status: "success".into(),
            }),
        )),
        Err(CoreError::BundleNotFound(path)) => {
            tracing::error!("Append entry error: bundle file not found: {}", path);
            Err((StatusCode::BAD_REQUEST, "File not found"))
        }
        Err(e) => {
            tracing::error!("Append entry error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

/// Visualisation page: per-category breakdown plus the full record list.
#[axum::debug_handler]
pub async fn visualization_page(State(state): State<AppState>) -> Html<String> {
    let allergies = state.data_source.allergies();
    let summary = summarise(&allergies);
    Html(pages::render_visualization(
        &allergies,
        &summary,
        state.cfg.other_threshold(),
    ))
}

/// Plain table of aggregated records.
#[axum::debug_handler]
pub async fn allergies_page(State(state): State<AppState>) -> Html<String> {
    let allergies = state.data_source.allergies();
    Html(pages::render_allergy_table(&allergies))
}
