use anyhow::{Context, Result};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use hive_mock_api::api::{build_router, AppState};
use hive_mock_api::config::{ActivitySinkKind, Config};
use hive_mock_api::coordination::{RandomEntropy, TaskGenerator};
use hive_mock_api::domain::repositories::{ActivitySink, TaskCatalog};
use hive_mock_api::infrastructure::activity::{JsonlActivitySink, NoopActivitySink};
use hive_mock_api::infrastructure::repositories::InMemoryClaimRegistry;
use hive_mock_api::infrastructure::seed::seeded_catalog;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;
    init_logging(&config.log_level)?;

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    let catalog: Arc<dyn TaskCatalog> =
        Arc::new(seeded_catalog().await.context("Failed to seed task catalog")?);
    let sink: Arc<dyn ActivitySink> = match config.activity_sink {
        ActivitySinkKind::Jsonl => {
            info!(dir = %config.activity_dir.display(), "Recording activity to JSONL files");
            Arc::new(JsonlActivitySink::new(config.activity_dir.clone()))
        }
        ActivitySinkKind::Disabled => {
            info!("Activity recording disabled");
            Arc::new(NoopActivitySink)
        }
    };

    let state = AppState::new(
        catalog.clone(),
        Arc::new(InMemoryClaimRegistry::new()),
        sink,
        clock.clone(),
        config.lifecycle,
    )
    .with_active_repo_sampling(config.sample_active_repos);

    // Background task generator
    let generator = Arc::new(TaskGenerator::new(
        catalog,
        clock,
        Arc::new(RandomEntropy),
        config.generator.clone(),
    ));
    let generator_token = generator.shutdown_token();
    let generator_handle = generator.start();

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        claim_ttl_secs = config.lifecycle.claim_ttl.num_seconds(),
        completion_policy = %config.lifecycle.completion_policy,
        "Mock Hive API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(generator_token))
        .await
        .context("HTTP server failed")?;

    if let Err(e) = generator_handle.await {
        warn!("Task generator ended abnormally: {}", e);
    }
    info!("Mock Hive API stopped");

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM and stops background work
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    token.cancel();
}
