use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use fileward_core::AppError;

use crate::error::HttpAppError;
use crate::handlers::{build_provenance, UploadResponse};
use crate::limits;
use crate::services::{FieldSpec, UploadService};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientAddr;
use crate::utils::link::validate_destination_link;

/// Companion fields for an advertisement, all required.
const ADVERTISEMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        max_length: 120,
    },
    FieldSpec {
        name: "company",
        max_length: 120,
    },
    FieldSpec {
        name: "description",
        max_length: 2000,
    },
    FieldSpec {
        name: "link",
        max_length: 2048,
    },
];

/// Upload an advertisement banner with its companion fields. The destination
/// link must be an absolute http(s) URL to a public host.
#[tracing::instrument(skip(state, headers, client_addr, multipart), fields(operation = "upload_advertisement"))]
pub async fn upload_advertisement(
    State(state): State<Arc<AppState>>,
    client_addr: ClientAddr,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let provenance = build_provenance(&state, &headers, client_addr);

    // The link check needs the drained fields, so the limiter runs here and
    // the pre-read request is handed to the orchestrator.
    limits::check_header_pairs(&headers, &state.limits)
        .map_err(|e| HttpAppError::from(AppError::from(e)))?;
    let raw = limits::read_multipart(multipart, &state.limits)
        .await
        .map_err(|e| HttpAppError::from(AppError::from(e)))?;

    if let Some(link) = raw.fields.get("link") {
        validate_destination_link(link)
            .map_err(|msg| HttpAppError::from(AppError::InvalidLink(msg)))?;
    }

    let outcome = UploadService::new(&state)
        .handle_raw(
            raw,
            &state.policies.advertisement,
            ADVERTISEMENT_FIELDS,
            provenance,
        )
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(outcome))))
}
