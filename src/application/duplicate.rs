use crate::domain::ports::SharedSubmissionStore;
use crate::domain::submission::{Amount, EmailAddress, Submission, SubmissionStatus};
use crate::error::StoreError;

/// Result of a duplicate-by-content lookup.
#[derive(Debug)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub existing: Option<Submission>,
}

/// Detects whether a submission with the same content was already processed.
///
/// Only records with status `success` count as duplicates; failed and
/// pending attempts never block a resubmission. Email normalization happens
/// in [`EmailAddress`], so callers and the pipeline share one canonical
/// form.
pub struct DuplicateDetector {
    store: SharedSubmissionStore,
}

impl DuplicateDetector {
    pub fn new(store: SharedSubmissionStore) -> Self {
        Self { store }
    }

    pub async fn check(
        &self,
        email: &EmailAddress,
        amount: Amount,
    ) -> Result<DuplicateCheck, StoreError> {
        let existing = self
            .store
            .find_by_content(email, amount, SubmissionStatus::Success)
            .await?;
        Ok(DuplicateCheck {
            is_duplicate: existing.is_some(),
            existing,
        })
    }
}
