//! Provenance metadata for accepted uploads
//!
//! Non-authoritative audit annotations stamped onto a successful upload
//! outcome: who sent it, from where, with what client, and when. Never used
//! for authorization decisions.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProvenanceMetadata {
    /// Identifier of the acting principal, when the caller supplies one.
    pub actor_id: Option<String>,
    /// Originating network address as observed at the HTTP boundary.
    pub remote_addr: String,
    /// Client-declared agent string.
    pub user_agent: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ProvenanceMetadata {
    pub fn new(actor_id: Option<String>, remote_addr: String, user_agent: Option<String>) -> Self {
        ProvenanceMetadata {
            actor_id,
            remote_addr,
            user_agent,
            recorded_at: Utc::now(),
        }
    }
}
