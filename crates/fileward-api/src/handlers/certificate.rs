use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::error::HttpAppError;
use crate::handlers::{build_provenance, UploadResponse};
use crate::services::UploadService;
use crate::state::AppState;
use crate::utils::ip_extraction::ClientAddr;

/// Upload a certificate: an image or a PDF document, no companion fields.
#[tracing::instrument(skip(state, headers, client_addr, multipart), fields(operation = "upload_certificate"))]
pub async fn upload_certificate(
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
            &state.policies.certificate,
            &[],
            provenance,
        )
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(outcome))))
}
