//! HTTP handlers, one per upload call site plus object lifecycle routes.

mod advertisement;
mod certificate;
mod health;
mod objects;
mod portfolio;
mod profile_photo;

pub use advertisement::upload_advertisement;
pub use certificate::upload_certificate;
pub use health::health;
pub use objects::{delete_objects, lookup_object};
pub use portfolio::upload_portfolio;
pub use profile_photo::upload_profile_photo;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use fileward_core::ProvenanceMetadata;
use serde::Serialize;

use crate::services::UploadOutcome;
use crate::state::AppState;
use crate::utils::ip_extraction::{extract_client_ip, ClientAddr};

/// Uniform success body: the storage locator plus echoed companion fields.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub filename: String,
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        UploadResponse {
            success: true,
            url: outcome.stored.url,
            key: outcome.stored.key,
            size: outcome.stored.size,
            content_type: outcome.stored.content_type,
            filename: outcome.sanitized_filename,
            fields: outcome.fields,
        }
    }
}

/// Build audit provenance from request metadata. The actor id is taken from
/// the X-Actor-Id header when the fronting layer supplies one.
pub(crate) fn build_provenance(
    state: &Arc<AppState>,
    headers: &HeaderMap,
    client_addr: ClientAddr,
) -> ProvenanceMetadata {
    let remote_addr = extract_client_ip(
        headers,
        client_addr.0.as_ref(),
        state.config.trusted_proxy_count,
    );
    let actor_id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    ProvenanceMetadata::new(actor_id, remote_addr, user_agent)
}
