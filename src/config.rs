use std::time::Duration;

/// Tuning knobs for the retry-orchestrated pipeline.
///
/// The wait before retry attempt `n` is `backoff_unit * 2^n`, so with the
/// default one-second unit a submission waits 2s after the first failure and
/// 4s after the second.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Probability table and delay range for the downstream simulator.
///
/// The delayed-success branch takes whatever probability mass the first two
/// weights leave over.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub success_weight: f64,
    pub retryable_failure_weight: f64,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            success_weight: 0.30,
            retryable_failure_weight: 0.40,
            delay_min: Duration::from_secs(5),
            delay_max: Duration::from_secs(10),
        }
    }
}
