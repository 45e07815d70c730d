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

/// Upload a profile picture: a single image, no companion fields.
///
/// # Errors
/// - Limiter rejections (`FILE_TOO_LARGE`, `TOO_MANY_FILES`, ...)
/// - Validation rejections (`INVALID_FILE_TYPE`, `INVALID_FILE_SIGNATURE`, ...)
/// - `STORAGE_UNAVAILABLE` when the storage retries are exhausted
#[tracing::instrument(skip(state, headers, client_addr, multipart), fields(operation = "upload_profile_photo"))]
pub async fn upload_profile_photo(
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
            &state.policies.profile_photo,
            &[],
            provenance,
        )
        .await
        .map_err(HttpAppError::from)?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(outcome))))
}
