use crate::domain::submission::Submission;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Errors surfaced by the submission pipeline.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error("a successful submission with the same email and amount already exists")]
    Duplicate { existing: Box<Submission> },
    #[error("downstream processor unavailable after {} attempts", submission.retry_count)]
    DownstreamExhausted { submission: Box<Submission> },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by a [`crate::domain::ports::SubmissionStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("submission {0} not found")]
    NotFound(Uuid),
    #[error("idempotency key is already bound to submission {}", existing.id)]
    IdempotencyKeyConflict { existing: Box<Submission> },
    #[error("submission {0} is terminal and cannot be modified")]
    TerminalStateViolation(Uuid),
}

/// A transport-level fault from the downstream call itself, as opposed to a
/// structured `RetryableFailure` outcome. The pipeline retry-counts both
/// identically.
#[derive(Error, Debug)]
#[error("downstream call failed: {0}")]
pub struct DownstreamFault(pub String);
