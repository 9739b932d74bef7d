use super::submission::{Amount, EmailAddress, Submission, SubmissionStatus};
use crate::error::{DownstreamFault, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// What the downstream processor reported for a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    RetryableFailure,
    /// Same as `Success`, but the call only resolved after an artificial
    /// delay on the processor side.
    DelayedSuccess,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::DelayedSuccess)
    }
}

/// The unreliable external dependency every submission is forwarded to.
///
/// All structured failures are retryable by construction; a `DownstreamFault`
/// models a fault in the call itself and is retry-counted the same way.
#[async_trait]
pub trait DownstreamProcessor: Send + Sync {
    async fn process(&self) -> Result<Outcome, DownstreamFault>;
}

/// Fields the pipeline supplies when creating a record. The store assigns
/// `id` and `submitted_at` and starts the record at `pending`.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub email: EmailAddress,
    pub amount: Amount,
    pub idempotency_key: Option<String>,
}

/// The mutations allowed after creation: retry-count bookkeeping while the
/// loop runs, and the terminal fields when it finishes.
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatch {
    pub status: Option<SubmissionStatus>,
    pub retry_count: Option<u32>,
    pub error_message: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl SubmissionPatch {
    pub fn retries(retry_count: u32) -> Self {
        Self {
            retry_count: Some(retry_count),
            ..Self::default()
        }
    }

    pub fn succeeded(retry_count: u32, processed_at: DateTime<Utc>) -> Self {
        Self {
            status: Some(SubmissionStatus::Success),
            retry_count: Some(retry_count),
            processed_at: Some(processed_at),
            error_message: None,
        }
    }

    pub fn failed(retry_count: u32, message: impl Into<String>) -> Self {
        Self {
            status: Some(SubmissionStatus::Failed),
            retry_count: Some(retry_count),
            error_message: Some(message.into()),
            processed_at: None,
        }
    }
}

/// Durable submission records with the two narrow lookups the pipeline
/// needs: by idempotency key and by content + status. Single-record
/// operations are atomic; there are no cross-record transactions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persists a new `pending` record. Fails with
    /// [`StoreError::IdempotencyKeyConflict`] when the draft carries a key
    /// that is already bound — the final arbiter for same-key races.
    async fn create(&self, draft: SubmissionDraft) -> Result<Submission, StoreError>;

    /// Applies a patch to an existing record. Terminal records reject every
    /// patch with [`StoreError::TerminalStateViolation`].
    async fn update(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission, StoreError>;

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Submission>, StoreError>;

    async fn find_by_content(
        &self,
        email: &EmailAddress,
        amount: Amount,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>, StoreError>;

    /// Most-recent-first, at most `limit` records.
    async fn list(&self, limit: usize) -> Result<Vec<Submission>, StoreError>;
}

pub type SharedSubmissionStore = Arc<dyn SubmissionStore>;
pub type DownstreamProcessorBox = Box<dyn DownstreamProcessor>;
