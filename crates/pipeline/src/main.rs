//! Function runtime entrypoint: one S3 notification batch per invocation.

use lambda_runtime::{LambdaEvent, service_fn};
use tracing_subscriber::EnvFilter;

use relay_common::config::RelayConfig;
use relay_notifier::GithubDispatcher;
use relay_pipeline::Pipeline;
use relay_storage::S3ObjectStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("relay_pipeline=info,relay_notifier=info,relay_storage=info")
        }))
        .json()
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(config = ?config, "Relay handler starting");

    let store = S3ObjectStore::new(&config).await;
    let dispatcher = GithubDispatcher::new(&config)?;
    let pipeline = Pipeline::new(store, dispatcher);
    let pipeline = &pipeline;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| async move {
        let request_id = event.context.request_id.clone();
        match pipeline.handle_payload(event.payload).await {
            Ok(message) => Ok(message.to_string()),
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    stage = e.stage(),
                    error = %e,
                    "Invocation failed"
                );
                Err(lambda_runtime::Error::from(e))
            }
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
