use crate::config::SimulatorConfig;
use crate::domain::ports::{DownstreamProcessor, Outcome};
use crate::error::DownstreamFault;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::Mutex;

/// Simulates an unreliable downstream processor.
///
/// Each invocation draws independently from the configured probability
/// table: immediate success, immediate retryable failure, or a success that
/// only resolves after a uniform delay from the configured range. The RNG is
/// injected (seedable) so outcome sequences can be pinned in tests; by
/// construction the simulator never raises a fault.
pub struct FlakyProcessor {
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
}

impl FlakyProcessor {
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: SimulatorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulatorConfig, rng: StdRng) -> Self {
        debug_assert!(config.success_weight + config.retryable_failure_weight <= 1.0);
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl DownstreamProcessor for FlakyProcessor {
    async fn process(&self) -> Result<Outcome, DownstreamFault> {
        let (roll, delay_secs) = {
            let mut rng = self.rng.lock().await;
            let roll: f64 = rng.r#gen();
            let delay_secs = rng.gen_range(
                self.config.delay_min.as_secs_f64()..=self.config.delay_max.as_secs_f64(),
            );
            (roll, delay_secs)
        };

        if roll < self.config.success_weight {
            Ok(Outcome::Success)
        } else if roll < self.config.success_weight + self.config.retryable_failure_weight {
            Ok(Outcome::RetryableFailure)
        } else {
            tokio::time::sleep(Duration::from_secs_f64(delay_secs)).await;
            Ok(Outcome::DelayedSuccess)
        }
    }
}
