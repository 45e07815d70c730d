use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::error::HttpAppError;
use crate::handlers::{build_provenance, UploadResponse};
use crate::services::{FieldSpec, UploadService};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientAddr;

/// Companion fields for a portfolio entry, both required.
const PORTFOLIO_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        max_length: 120,
    },
    FieldSpec {
        name: "description",
        max_length: 2000,
    },
];

/// Upload a portfolio entry image with its title and description.
#[tracing::instrument(skip(state, headers, client_addr, multipart), fields(operation = "upload_portfolio"))]
pub async fn upload_portfolio(
    State(state): State<Arc<AppState>>,
    client_addr: ClientAddr,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let provenance = build_provenance(&state, &headers, client_addr);

    let outcome = UploadService::new(&state)
        .handle(
            &headers,
            multipart,
            &state.policies.portfolio,
            PORTFOLIO_FIELDS,
            provenance,
        )
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(outcome))))
}
