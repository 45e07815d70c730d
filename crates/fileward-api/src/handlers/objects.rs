//! Object lifecycle routes for the domain layer: bulk deletion and
//! existence lookup.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use fileward_core::AppError;
use fileward_storage::{DeletionReport, ObjectInfo};
use serde::{Deserialize, Serialize};

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// True only when every requested key was deleted.
    pub success: bool,
    #[serde(flatten)]
    pub report: DeletionReport,
}

/// Best-effort bulk deletion. Partial failures are reported per key so the
/// caller can retry only the failed subset.
#[tracing::instrument(skip(state, request), fields(operation = "delete_objects"))]
pub async fn delete_objects(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    if request.keys.is_empty() {
        return Err(HttpAppError::from(AppError::BadRequest(
            "No storage keys provided".to_string(),
        )));
    }

    let report = state.storage.delete_many(&request.keys).await;

    Ok(Json(DeleteResponse {
        success: report.is_complete(),
        report,
    }))
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub success: bool,
    pub object: ObjectInfo,
}

/// Existence/size lookup for a stored object by its full storage key.
#[tracing::instrument(skip(state), fields(operation = "lookup_object"))]
pub async fn lookup_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<LookupResponse>, HttpAppError> {
    let object = state
        .storage
        .lookup(&key)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(LookupResponse {
        success: true,
        object,
    }))
}
