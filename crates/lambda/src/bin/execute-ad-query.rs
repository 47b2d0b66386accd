use anyhow::{anyhow, Result};
use tracing::info;

use adbridge_core::config::{AppConfig, LoadOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    adbridge_lambda::init_logging(&config.logging);

    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting command execution handler"
    );
    let adapter = adbridge_lambda::command_adapter(&config).await?;

    adbridge_lambda::serve(adapter).await.map_err(|err| anyhow!(err))
}
