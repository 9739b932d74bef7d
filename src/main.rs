use clap::Parser;
use formgate::application::pipeline::SubmissionPipeline;
use formgate::config::{PipelineConfig, SimulatorConfig};
use formgate::domain::ports::SharedSubmissionStore;
use formgate::infrastructure::in_memory::InMemorySubmissionStore;
use formgate::infrastructure::simulator::FlakyProcessor;
use formgate::interfaces::http;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Maximum downstream attempts per submission
    #[arg(long, env = "MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Backoff time unit in milliseconds; the wait before retry n is 2^n units
    #[arg(long, env = "BACKOFF_UNIT_MS", default_value_t = 1000)]
    backoff_unit_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,formgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: SharedSubmissionStore = Arc::new(InMemorySubmissionStore::new());
    let processor = Box::new(FlakyProcessor::new(SimulatorConfig::default()));
    let pipeline = Arc::new(SubmissionPipeline::new(
        store,
        processor,
        PipelineConfig {
            max_retries: cli.max_retries,
            backoff_unit: Duration::from_millis(cli.backoff_unit_ms),
        },
    ));

    let app = http::router(pipeline);
    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .into_diagnostic()?;
    tracing::info!(
        "server listening on {}",
        listener.local_addr().into_diagnostic()?
    );
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}
