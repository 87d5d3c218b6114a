//! Network API binary entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qnet_api::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qnet_api=info,qnet_sim=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create configuration
    let mut config = ServerConfig::default();
    if let Ok(bind) = std::env::var("QNET_BIND") {
        config.bind_address = bind
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid QNET_BIND address '{bind}': {e}"))?;
    }
    // Create application state and start the server
    let state = Arc::new(AppState::with_config(config));
    tracing::info!("Starting the quantum network API");
    qnet_api::serve(state).await?;

    Ok(())
}
