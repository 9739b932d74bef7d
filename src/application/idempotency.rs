use crate::domain::ports::SharedSubmissionStore;
use crate::domain::submission::Submission;
use crate::error::StoreError;

/// Resolves a caller-supplied idempotency key to a prior submission.
///
/// Idempotency is opt-in: an absent key always resolves to none. A present
/// key matches records of any status, so a resubmission short-circuits even
/// while an earlier attempt ended in `failed`.
pub struct IdempotencyResolver {
    store: SharedSubmissionStore,
}

impl IdempotencyResolver {
    pub fn new(store: SharedSubmissionStore) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, key: Option<&str>) -> Result<Option<Submission>, StoreError> {
        match key {
            None => Ok(None),
            Some(key) => self.store.find_by_idempotency_key(key).await,
        }
    }
}
