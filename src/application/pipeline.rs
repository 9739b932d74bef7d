use crate::application::duplicate::{DuplicateCheck, DuplicateDetector};
use crate::application::idempotency::IdempotencyResolver;
use crate::config::PipelineConfig;
use crate::domain::ports::{
    DownstreamProcessorBox, Outcome, SharedSubmissionStore, SubmissionDraft, SubmissionPatch,
};
use crate::domain::submission::{Amount, EmailAddress, Submission};
use crate::error::{Result, StoreError, SubmissionError};
use chrono::Utc;
use rust_decimal::Decimal;
use std::time::Duration;

const MAX_RETRIES_MESSAGE: &str = "max retries reached";

/// Raw client input, validated by the pipeline before anything is persisted.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub email: String,
    pub amount: Decimal,
    pub idempotency_key: Option<String>,
}

/// How a successful `submit` call concluded.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// A new record was created and driven to terminal `success`.
    Completed(Submission),
    /// An idempotency key matched a prior record; that record's current
    /// state is returned and the downstream processor is not invoked.
    Replayed(Submission),
}

impl SubmitOutcome {
    pub fn submission(&self) -> &Submission {
        match self {
            Self::Completed(s) | Self::Replayed(s) => s,
        }
    }
}

/// The retry-orchestrated submission pipeline.
///
/// Owns the store and the downstream processor, consults the idempotency and
/// duplicate guards, and drives every created record to a terminal state
/// before returning. Callers never observe `pending`.
pub struct SubmissionPipeline {
    store: SharedSubmissionStore,
    processor: DownstreamProcessorBox,
    duplicates: DuplicateDetector,
    idempotency: IdempotencyResolver,
    config: PipelineConfig,
}

impl SubmissionPipeline {
    pub fn new(
        store: SharedSubmissionStore,
        processor: DownstreamProcessorBox,
        config: PipelineConfig,
    ) -> Self {
        Self {
            duplicates: DuplicateDetector::new(store.clone()),
            idempotency: IdempotencyResolver::new(store.clone()),
            store,
            processor,
            config,
        }
    }

    /// Processes one submission end-to-end.
    ///
    /// Ordering is fixed: validate, idempotency short-circuit, duplicate
    /// short-circuit, create `pending`, retry loop, finalize. Validation and
    /// guard failures leave no partial state behind.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitOutcome> {
        let email = EmailAddress::parse(&request.email)?;
        let amount = Amount::try_from(request.amount)?;

        if let Some(prior) = self
            .idempotency
            .resolve(request.idempotency_key.as_deref())
            .await?
        {
            tracing::debug!(id = %prior.id, status = ?prior.status, "idempotent replay");
            return Ok(SubmitOutcome::Replayed(prior));
        }

        let check = self.duplicates.check(&email, amount).await?;
        if let Some(existing) = check.existing {
            return Err(SubmissionError::Duplicate {
                existing: Box::new(existing),
            });
        }

        let draft = SubmissionDraft {
            email,
            amount,
            idempotency_key: request.idempotency_key,
        };
        let submission = match self.store.create(draft).await {
            Ok(submission) => submission,
            // Lost the creation race for this key; the winner's record is
            // authoritative, so read-and-return instead of erroring.
            Err(StoreError::IdempotencyKeyConflict { existing }) => {
                return Ok(SubmitOutcome::Replayed(*existing));
            }
            Err(other) => return Err(other.into()),
        };

        self.drive_to_terminal(submission).await
    }

    /// Runs the bounded retry loop and persists the terminal state.
    async fn drive_to_terminal(&self, submission: Submission) -> Result<SubmitOutcome> {
        let id = submission.id;
        let mut retry_count = 0u32;

        loop {
            // Falling through the match means this attempt is retryable,
            // either as a structured failure or as a transport fault.
            let fault = match self.processor.process().await {
                Ok(Outcome::Success | Outcome::DelayedSuccess) => {
                    let finished = self
                        .store
                        .update(id, SubmissionPatch::succeeded(retry_count, Utc::now()))
                        .await?;
                    tracing::info!(%id, retry_count, "submission processed");
                    return Ok(SubmitOutcome::Completed(finished));
                }
                Ok(Outcome::RetryableFailure) => None,
                Err(fault) => Some(fault),
            };

            if let Some(fault) = fault {
                tracing::warn!(%id, attempt = retry_count + 1, error = %fault, "downstream call fault");
            }
            retry_count += 1;

            if retry_count >= self.config.max_retries {
                let failed = self
                    .store
                    .update(id, SubmissionPatch::failed(retry_count, MAX_RETRIES_MESSAGE))
                    .await?;
                tracing::warn!(%id, retry_count, "retry budget exhausted");
                return Err(SubmissionError::DownstreamExhausted {
                    submission: Box::new(failed),
                });
            }

            self.store
                .update(id, SubmissionPatch::retries(retry_count))
                .await?;
            tokio::time::sleep(self.backoff(retry_count)).await;
        }
    }

    /// `backoff(n) = 2^n` time units: 2 units after the first failure, 4
    /// after the second.
    fn backoff(&self, retry_count: u32) -> Duration {
        self.config.backoff_unit * 2u32.pow(retry_count)
    }

    /// Advisory duplicate pre-check for the client-facing endpoint.
    pub async fn check_duplicate(&self, email: &str, amount: Decimal) -> Result<DuplicateCheck> {
        let email = EmailAddress::parse(email)?;
        let amount = Amount::try_from(amount)?;
        Ok(self.duplicates.check(&email, amount).await?)
    }

    pub async fn recent_submissions(&self, limit: usize) -> Result<Vec<Submission>> {
        Ok(self.store.list(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{DownstreamProcessor, SubmissionStore};
    use crate::error::DownstreamFault;
    use crate::infrastructure::in_memory::InMemorySubmissionStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct AlwaysSucceeds;

    #[async_trait]
    impl DownstreamProcessor for AlwaysSucceeds {
        async fn process(&self) -> std::result::Result<Outcome, DownstreamFault> {
            Ok(Outcome::Success)
        }
    }

    fn pipeline(store: Arc<InMemorySubmissionStore>) -> SubmissionPipeline {
        SubmissionPipeline::new(
            store,
            Box::new(AlwaysSucceeds),
            PipelineConfig {
                max_retries: 3,
                backoff_unit: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn test_validation_failure_creates_no_record() {
        let store = Arc::new(InMemorySubmissionStore::new());
        let pipeline = pipeline(store.clone());

        for (email, amount) in [("not-an-email", dec!(10)), ("a@b.com", dec!(0))] {
            let err = pipeline
                .submit(SubmitRequest {
                    email: email.to_string(),
                    amount,
                    idempotency_key: None,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, SubmissionError::Validation(_)));
        }

        assert!(store.list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_is_normalized_before_storage() {
        let store = Arc::new(InMemorySubmissionStore::new());
        let pipeline = pipeline(store);

        let outcome = pipeline
            .submit(SubmitRequest {
                email: "  A@B.com ".to_string(),
                amount: dec!(10),
                idempotency_key: None,
            })
            .await
            .unwrap();
        assert_eq!(outcome.submission().email.as_str(), "a@b.com");
    }

    #[tokio::test]
    async fn test_check_duplicate_validates_input() {
        let store = Arc::new(InMemorySubmissionStore::new());
        let pipeline = pipeline(store);

        let err = pipeline.check_duplicate("bad", dec!(10)).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Validation(_)));
        let err = pipeline.check_duplicate("a@b.com", dec!(-1)).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Validation(_)));
    }
}
