#![allow(dead_code)]

use async_trait::async_trait;
use formgate::application::pipeline::{SubmissionPipeline, SubmitRequest};
use formgate::config::PipelineConfig;
use formgate::domain::ports::{DownstreamProcessor, Outcome};
use formgate::error::DownstreamFault;
use formgate::infrastructure::in_memory::InMemorySubmissionStore;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A downstream processor that replays a fixed script of outcomes.
///
/// Records every invocation (count and virtual-clock instant) so tests can
/// assert both at-most-once semantics and backoff timing. Once the script is
/// exhausted it keeps returning `Success`.
#[derive(Clone, Default)]
pub struct ScriptedProcessor {
    script: Arc<Mutex<VecDeque<Result<Outcome, String>>>>,
    calls: Arc<AtomicUsize>,
    instants: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl ScriptedProcessor {
    pub fn new(script: impl IntoIterator<Item = Result<Outcome, &'static str>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                script
                    .into_iter()
                    .map(|step| step.map_err(str::to_string))
                    .collect(),
            )),
            calls: Arc::new(AtomicUsize::new(0)),
            instants: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always_failing() -> Self {
        Self::new([
            Ok(Outcome::RetryableFailure),
            Ok(Outcome::RetryableFailure),
            Ok(Outcome::RetryableFailure),
        ])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn call_instants(&self) -> Vec<tokio::time::Instant> {
        self.instants.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownstreamProcessor for ScriptedProcessor {
    async fn process(&self) -> Result<Outcome, DownstreamFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.instants.lock().unwrap().push(tokio::time::Instant::now());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(DownstreamFault(message)),
            None => Ok(Outcome::Success),
        }
    }
}

pub const BACKOFF_UNIT: Duration = Duration::from_millis(100);

pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        max_retries: 3,
        backoff_unit: BACKOFF_UNIT,
    }
}

pub fn build_pipeline(
    processor: ScriptedProcessor,
) -> (SubmissionPipeline, Arc<InMemorySubmissionStore>) {
    let store = Arc::new(InMemorySubmissionStore::new());
    let pipeline = SubmissionPipeline::new(store.clone(), Box::new(processor), fast_config());
    (pipeline, store)
}

pub fn request(email: &str, amount: Decimal, idempotency_key: Option<&str>) -> SubmitRequest {
    SubmitRequest {
        email: email.to_string(),
        amount,
        idempotency_key: idempotency_key.map(str::to_string),
    }
}
