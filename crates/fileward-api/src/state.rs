//! Application state
//!
//! All shared state is constructed once at startup and injected: the storage
//! client handle is explicit (no ambient global), and the per-call-site
//! policies are immutable instances owned by the state.

use std::sync::Arc;

use fileward_core::{Config, UploadPolicy};
use fileward_storage::{ObjectStorage, RetryPolicy, RetryingStore};
use tokio_util::sync::CancellationToken;

use crate::limits::IngestLimits;

/// Immutable per-call-site upload policies.
#[derive(Debug, Clone)]
pub struct Policies {
    pub profile_photo: UploadPolicy,
    pub certificate: UploadPolicy,
    pub portfolio: UploadPolicy,
    pub advertisement: UploadPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        Policies {
            profile_photo: UploadPolicy::profile_photo(),
            certificate: UploadPolicy::certificate(),
            portfolio: UploadPolicy::portfolio(),
            advertisement: UploadPolicy::advertisement(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: RetryingStore,
    pub policies: Policies,
    pub limits: IngestLimits,
    /// Cancelled on graceful shutdown; in-flight persists abandon their
    /// retries instead of holding the process open.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn ObjectStorage>) -> Self {
        let retry_policy = RetryPolicy::from_config(&config);
        let limits = IngestLimits::from_config(&config);

        AppState {
            storage: RetryingStore::new(backend, retry_policy),
            policies: Policies::default(),
            limits,
            shutdown: CancellationToken::new(),
            config,
        }
    }
}
