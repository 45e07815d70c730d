//! Retrying persister
//!
//! Wraps an `ObjectStorage` backend with a bounded retry policy and
//! exponential backoff. The retry loop is driven by an explicit state machine
//! so the policy can be tested without real network calls: inject a backend
//! that fails N times and observe the attempt count and delays.
//!
//! Retried attempts reuse the same storage key, so a retry overwrites rather
//! than duplicates. Keys are unique per candidate, which means an overwrite
//! can only ever race with an earlier attempt carrying identical bytes.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::traits::{
    DeletionReport, FailedDeletion, ObjectInfo, ObjectStorage, StorageError, StorageResult,
    StoredObjectRef,
};

/// Maximum delay in seconds before retrying a failed attempt. Caps the
/// exponential backoff so that high attempt budgets do not produce
/// excessively long delays.
pub const MAX_BACKOFF_SECS: u64 = 300;

/// Computes the backoff delay after a given attempt (exponential with cap):
/// 2s after the first attempt, 4s after the second, and so on.
#[inline]
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2_u64.saturating_pow(attempt).min(MAX_BACKOFF_SECS))
}

/// Retry tuning for the persister.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (not just retries).
    pub max_attempts: u32,
    /// Hard upper bound on any single provider call.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &fileward_core::Config) -> Self {
        RetryPolicy {
            max_attempts: config.upload_max_attempts.max(1),
            attempt_timeout: Duration::from_secs(config.upload_attempt_timeout_secs.max(1)),
        }
    }
}

/// State of one persist call's retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistState {
    /// About to make attempt n (1-based).
    Attempting(u32),
    Succeeded,
    Exhausted,
}

impl PersistState {
    /// Next state after attempt n failed.
    pub fn after_failure(self, max_attempts: u32) -> PersistState {
        match self {
            PersistState::Attempting(n) if n < max_attempts => PersistState::Attempting(n + 1),
            PersistState::Attempting(_) => PersistState::Exhausted,
            other => other,
        }
    }
}

/// One provider call within a persist. The history is in-memory only and is
/// discarded once a terminal outcome is reached.
#[derive(Debug, Clone)]
struct UploadAttempt {
    number: u32,
    error: String,
    at: DateTime<Utc>,
}

/// An `ObjectStorage` wrapper adding the retry/backoff policy.
#[derive(Clone)]
pub struct RetryingStore {
    inner: Arc<dyn ObjectStorage>,
    policy: RetryPolicy,
}

impl RetryingStore {
    pub fn new(inner: Arc<dyn ObjectStorage>, policy: RetryPolicy) -> Self {
        RetryingStore { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// The wrapped backend, for operations that bypass the retry loop.
    pub fn backend(&self) -> &Arc<dyn ObjectStorage> {
        &self.inner
    }

    /// Upload bytes with bounded retries and exponential backoff.
    ///
    /// Makes at most `max_attempts` provider calls, each bounded by the
    /// per-attempt timeout, sleeping `backoff_delay(n)` between attempts.
    /// Cancelling the token abandons any in-flight attempt and schedules no
    /// further retries.
    pub async fn persist(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> StorageResult<StoredObjectRef> {
        let size = data.len() as u64;
        let mut history: Vec<UploadAttempt> = Vec::new();
        let mut state = PersistState::Attempting(1);

        while let PersistState::Attempting(attempt) = state {
            if cancel.is_cancelled() {
                return Err(StorageError::Cancelled);
            }

            let call = timeout(
                self.policy.attempt_timeout,
                self.inner.put(storage_key, content_type, data.clone()),
            );
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StorageError::Cancelled),
                res = call => res,
            };

            match outcome {
                Ok(Ok(url)) => {
                    tracing::info!(
                        key = %storage_key,
                        attempts = attempt,
                        size_bytes = size,
                        "Object persisted"
                    );
                    return Ok(StoredObjectRef {
                        key: storage_key.to_string(),
                        url,
                        size,
                        content_type: content_type.to_string(),
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        key = %storage_key,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        "Upload attempt failed"
                    );
                    history.push(UploadAttempt {
                        number: attempt,
                        error: e.to_string(),
                        at: Utc::now(),
                    });
                }
                Err(_) => {
                    let timeout_secs = self.policy.attempt_timeout.as_secs();
                    tracing::warn!(
                        key = %storage_key,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        timeout_secs,
                        "Upload attempt timed out"
                    );
                    history.push(UploadAttempt {
                        number: attempt,
                        error: StorageError::AttemptTimeout(timeout_secs).to_string(),
                        at: Utc::now(),
                    });
                }
            }

            state = state.after_failure(self.policy.max_attempts);
            if let PersistState::Attempting(_) = state {
                let delay = backoff_delay(attempt);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(StorageError::Cancelled),
                    _ = sleep(delay) => {}
                }
            }
        }

        let (attempts, last_error) = match history.last() {
            Some(last) => {
                tracing::error!(
                    key = %storage_key,
                    attempts = last.number,
                    last_attempt_at = %last.at,
                    last_error = %last.error,
                    "Upload retries exhausted"
                );
                (last.number, last.error.clone())
            }
            None => (0, "unknown error".to_string()),
        };
        Err(StorageError::Unavailable {
            attempts,
            last_error,
        })
    }

    /// Best-effort bulk deletion with a per-key report. An already-absent
    /// object counts as deleted (the end state is the same).
    pub async fn delete_many(&self, keys: &[String]) -> DeletionReport {
        let mut report = DeletionReport::default();

        for key in keys {
            match self.inner.delete(key).await {
                Ok(()) | Err(StorageError::NotFound(_)) => report.deleted.push(key.clone()),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Bulk delete failed for key");
                    report.failed.push(FailedDeletion {
                        key: key.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Bulk deletion finished"
        );

        report
    }

    /// Existence/size lookup for a stored object.
    pub async fn lookup(&self, storage_key: &str) -> StorageResult<ObjectInfo> {
        self.inner.head(storage_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fileward_core::StorageBackend;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Backend that fails the first `fail_first` puts, then succeeds.
    struct FlakyStorage {
        fail_first: u32,
        attempts: AtomicU32,
        /// Keys whose deletion should fail.
        poisoned_deletes: Mutex<Vec<String>>,
        /// Cancelled after the first put when set.
        cancel_after_first_put: Option<CancellationToken>,
        /// Simulated duration of each put.
        put_duration: Duration,
    }

    impl FlakyStorage {
        fn failing(fail_first: u32) -> Self {
            FlakyStorage {
                fail_first,
                attempts: AtomicU32::new(0),
                poisoned_deletes: Mutex::new(Vec::new()),
                cancel_after_first_put: None,
                put_duration: Duration::ZERO,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStorage for FlakyStorage {
        async fn put(
            &self,
            storage_key: &str,
            _content_type: &str,
            _data: Bytes,
        ) -> StorageResult<String> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.put_duration.is_zero() {
                sleep(self.put_duration).await;
            }
            if let Some(ref token) = self.cancel_after_first_put {
                token.cancel();
            }
            if n <= self.fail_first {
                Err(StorageError::UploadFailed("connection reset".to_string()))
            } else {
                Ok(format!("https://cdn.test/{}", storage_key))
            }
        }

        async fn delete(&self, storage_key: &str) -> StorageResult<()> {
            let poisoned = self.poisoned_deletes.lock().expect("lock");
            if poisoned.iter().any(|k| k == storage_key) {
                Err(StorageError::DeleteFailed("access denied".to_string()))
            } else {
                Ok(())
            }
        }

        async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo> {
            Ok(ObjectInfo {
                key: storage_key.to_string(),
                size: 0,
                last_modified: None,
            })
        }

        async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
            Ok(true)
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    fn store_with(backend: Arc<FlakyStorage>, max_attempts: u32) -> RetryingStore {
        RetryingStore::new(
            backend,
            RetryPolicy {
                max_attempts,
                attempt_timeout: Duration::from_secs(60),
            },
        )
    }

    #[test]
    fn backoff_delay_is_exponential() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn backoff_delay_is_capped() {
        assert_eq!(backoff_delay(20), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(backoff_delay(64), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn state_machine_transitions() {
        let state = PersistState::Attempting(1);
        assert_eq!(state.after_failure(3), PersistState::Attempting(2));
        assert_eq!(
            PersistState::Attempting(3).after_failure(3),
            PersistState::Exhausted
        );
        assert_eq!(
            PersistState::Succeeded.after_failure(3),
            PersistState::Succeeded
        );
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures_with_backoff() {
        let backend = Arc::new(FlakyStorage::failing(2));
        let store = store_with(backend.clone(), 3);

        let started = tokio::time::Instant::now();
        let stored = store
            .persist(
                "uploads/k-photo.png",
                "image/png",
                Bytes::from_static(b"data"),
                &CancellationToken::new(),
            )
            .await
            .expect("persist should succeed on the third attempt");

        assert_eq!(backend.attempts(), 3);
        assert_eq!(stored.key, "uploads/k-photo.png");
        assert_eq!(stored.size, 4);
        // Two backoff sleeps must have elapsed: 2s after the first failure,
        // 4s after the second.
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts() {
        let backend = Arc::new(FlakyStorage::failing(u32::MAX));
        let store = store_with(backend.clone(), 3);

        let err = store
            .persist(
                "uploads/k-photo.png",
                "image/png",
                Bytes::from_static(b"data"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(backend.attempts(), 3);
        match err {
            StorageError::Unavailable {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("connection reset"));
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_timeout_counts_as_failure() {
        let mut backend = FlakyStorage::failing(u32::MAX);
        backend.put_duration = Duration::from_secs(120);
        let backend = Arc::new(backend);
        let store = RetryingStore::new(
            backend.clone(),
            RetryPolicy {
                max_attempts: 1,
                attempt_timeout: Duration::from_secs(60),
            },
        );

        let err = store
            .persist(
                "uploads/k-photo.png",
                "image/png",
                Bytes::from_static(b"data"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            StorageError::Unavailable { last_error, .. } => {
                assert!(last_error.contains("timed out"));
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_retries() {
        let token = CancellationToken::new();
        let mut backend = FlakyStorage::failing(u32::MAX);
        backend.cancel_after_first_put = Some(token.clone());
        let backend = Arc::new(backend);
        let store = store_with(backend.clone(), 3);

        let err = store
            .persist(
                "uploads/k-photo.png",
                "image/png",
                Bytes::from_static(b"data"),
                &token,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Cancelled));
        // The in-flight attempt ran, but no retry was scheduled after it.
        assert_eq!(backend.attempts(), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_token_skips_all_attempts() {
        let token = CancellationToken::new();
        token.cancel();
        let backend = Arc::new(FlakyStorage::failing(0));
        let store = store_with(backend.clone(), 3);

        let err = store
            .persist(
                "uploads/k-photo.png",
                "image/png",
                Bytes::from_static(b"data"),
                &token,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Cancelled));
        assert_eq!(backend.attempts(), 0);
    }

    #[tokio::test]
    async fn delete_many_reports_per_key() {
        let backend = FlakyStorage::failing(0);
        backend
            .poisoned_deletes
            .lock()
            .expect("lock")
            .push("uploads/locked.png".to_string());
        let store = store_with(Arc::new(backend), 3);

        let keys = vec![
            "uploads/a.png".to_string(),
            "uploads/locked.png".to_string(),
            "uploads/b.png".to_string(),
        ];
        let report = store.delete_many(&keys).await;

        assert_eq!(report.deleted, vec!["uploads/a.png", "uploads/b.png"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].key, "uploads/locked.png");
        assert!(!report.is_complete());
    }
}
