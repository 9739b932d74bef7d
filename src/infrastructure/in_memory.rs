use crate::domain::ports::{SubmissionDraft, SubmissionPatch, SubmissionStore};
use crate::domain::submission::{Amount, EmailAddress, Submission, SubmissionStatus};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, Submission>,
    /// Insertion order, newest last. Drives `list` and breaks timestamp ties.
    order: Vec<Uuid>,
    /// Idempotency key -> record id. Uniqueness arbiter for same-key races.
    keys: HashMap<String, Uuid>,
}

/// A thread-safe in-memory submission store.
///
/// Uses `Arc<RwLock<..>>` for shared concurrent access. Every operation
/// holds the lock for its whole critical section, so the uniqueness check in
/// `create` cannot interleave with a concurrent insert of the same key.
#[derive(Default, Clone)]
pub struct InMemorySubmissionStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn create(&self, draft: SubmissionDraft) -> Result<Submission, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(key) = &draft.idempotency_key
            && let Some(existing_id) = inner.keys.get(key)
            && let Some(existing) = inner.records.get(existing_id)
        {
            return Err(StoreError::IdempotencyKeyConflict {
                existing: Box::new(existing.clone()),
            });
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            email: draft.email,
            amount: draft.amount,
            idempotency_key: draft.idempotency_key,
            status: SubmissionStatus::Pending,
            retry_count: 0,
            error_message: None,
            submitted_at: Utc::now(),
            processed_at: None,
        };

        if let Some(key) = &submission.idempotency_key {
            inner.keys.insert(key.clone(), submission.id);
        }
        inner.order.push(submission.id);
        inner.records.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn update(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission, StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if record.status.is_terminal() {
            return Err(StoreError::TerminalStateViolation(id));
        }

        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(retry_count) = patch.retry_count {
            record.retry_count = retry_count;
        }
        if let Some(message) = patch.error_message {
            record.error_message = Some(message);
        }
        if let Some(processed_at) = patch.processed_at {
            record.processed_at = Some(processed_at);
        }
        Ok(record.clone())
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Submission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .keys
            .get(key)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn find_by_content(
        &self,
        email: &EmailAddress,
        amount: Amount,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .find(|s| s.email == *email && s.amount == amount && s.status == status)
            .cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Submission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| inner.records.get(id))
            .cloned()
            .collect())
    }
}
