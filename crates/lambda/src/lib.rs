//! Lambda wiring for the adapters: logging setup, adapter construction from
//! [`AppConfig`], and the function-call event loop.

use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use thiserror::Error;
use tracing::{info, Level};

use adbridge_adapters::backend::{CommandService, DirectoryService};
use adbridge_adapters::{Adapter, CommandExecutionAdapter, DirectoryDataAdapter};
use adbridge_aws::{DirectoryDataService, SsmCommandService};
use adbridge_core::config::{AppConfig, ConfigError, LogFormat, LoggingConfig};
use adbridge_core::envelope::{AgentRequest, AgentResponse};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn init_logging(config: &LoggingConfig) {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

/// Builds the command adapter over an explicit backend.
pub fn build_command_adapter(
    config: &AppConfig,
    service: Arc<dyn CommandService>,
) -> Result<CommandExecutionAdapter, BootstrapError> {
    let settings = config.command_settings()?;
    let wait_budget_secs = settings.wait.budget.as_secs();
    let adapter = CommandExecutionAdapter::new(service, settings);
    info!(
        event_name = "system.bootstrap.adapter_ready",
        correlation_id = "bootstrap",
        adapter = adapter.name(),
        management_instance_id = %adapter.management_instance_id(),
        wait_budget_secs,
        "command adapter configured"
    );
    Ok(adapter)
}

pub fn build_directory_adapter(
    config: &AppConfig,
    service: Arc<dyn DirectoryService>,
) -> Result<DirectoryDataAdapter, BootstrapError> {
    let adapter = DirectoryDataAdapter::new(service, config.directory_settings()?);
    info!(
        event_name = "system.bootstrap.adapter_ready",
        correlation_id = "bootstrap",
        adapter = adapter.name(),
        directory_id = %adapter.directory_id(),
        "directory adapter configured"
    );
    Ok(adapter)
}

/// Command adapter backed by Systems Manager, using the ambient AWS configuration.
pub async fn command_adapter(
    config: &AppConfig,
) -> Result<CommandExecutionAdapter, BootstrapError> {
    // Settings are checked before the SDK config is loaded so a missing id fails fast.
    config.command_settings()?;
    let sdk_config = adbridge_aws::load_sdk_config().await;
    build_command_adapter(config, Arc::new(SsmCommandService::from_sdk_config(&sdk_config)))
}

pub async fn directory_adapter(
    config: &AppConfig,
) -> Result<DirectoryDataAdapter, BootstrapError> {
    config.directory_settings()?;
    let sdk_config = adbridge_aws::load_sdk_config().await;
    build_directory_adapter(config, Arc::new(DirectoryDataService::from_sdk_config(&sdk_config)))
}

/// Answers one function-call event. Adapters never fail, so neither does this.
pub async fn handle_event(
    adapter: &dyn Adapter,
    event: LambdaEvent<AgentRequest>,
) -> Result<AgentResponse, lambda_runtime::Error> {
    let (request, context) = event.into_parts();
    info!(
        event_name = "runtime.invocation.received",
        correlation_id = %request.session_id,
        request_id = %context.request_id,
        adapter = adapter.name(),
        operation = %request.operation,
        "function call received"
    );
    Ok(adapter.handle(request).await)
}

/// Runs the Lambda event loop until the runtime shuts down.
pub async fn serve<A>(adapter: A) -> Result<(), lambda_runtime::Error>
where
    A: Adapter + 'static,
{
    let adapter = Arc::new(adapter);
    info!(
        event_name = "system.runtime.started",
        correlation_id = "bootstrap",
        adapter = adapter.name(),
        "function-call loop started"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<AgentRequest>| {
        let adapter = Arc::clone(&adapter);
        async move { handle_event(adapter.as_ref(), event).await }
    }))
    .await
}
