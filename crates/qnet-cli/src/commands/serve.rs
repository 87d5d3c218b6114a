//! Serve command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;

use qnet_api::{AppState, ServerConfig};

/// Execute the serve command.
pub async fn execute(bind: &str) -> Result<()> {
    let bind_address = bind
        .parse()
        .with_context(|| format!("invalid bind address '{bind}'"))?;
    let config = ServerConfig {
        bind_address,
        ..ServerConfig::default()
    };

    println!(
        "{} Serving the quantum network API on {}",
        style("→").cyan().bold(),
        style(format!("http://{bind_address}")).green()
    );
    println!("  Press Ctrl-C to stop");

    let state = Arc::new(AppState::with_config(config));
    qnet_api::serve(state).await?;

    Ok(())
}
