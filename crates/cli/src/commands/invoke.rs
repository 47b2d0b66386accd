use std::fs;
use std::path::Path;

use adbridge_adapters::Adapter;
use adbridge_core::config::{AppConfig, LoadOptions};
use adbridge_core::envelope::AgentRequest;
use adbridge_lambda::BootstrapError;
use clap::ValueEnum;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INPUT, EXIT_RUNTIME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AdapterKind {
    Command,
    Directory,
}

/// Replays the request envelope at `event_path` through the AWS-backed adapter.
pub fn run(options: LoadOptions, kind: AdapterKind, event_path: &Path) -> CommandResult {
    let request = match read_request(event_path) {
        Ok(request) => request,
        Err(failure) => return failure,
    };

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "invoke",
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "invoke",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    let result = runtime.block_on(async {
        match kind {
            AdapterKind::Command => {
                let adapter = adbridge_lambda::command_adapter(&config).await?;
                Ok::<CommandResult, BootstrapError>(replay(&adapter, request).await)
            }
            AdapterKind::Directory => {
                let adapter = adbridge_lambda::directory_adapter(&config).await?;
                Ok::<CommandResult, BootstrapError>(replay(&adapter, request).await)
            }
        }
    });

    match result {
        Ok(result) => result,
        Err(error) => CommandResult::failure(
            "invoke",
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        ),
    }
}

/// Answers `request` with `adapter` and renders the response envelope.
pub async fn replay(adapter: &dyn Adapter, request: AgentRequest) -> CommandResult {
    let response = adapter.handle(request).await;
    match serde_json::to_string_pretty(&response) {
        Ok(output) => CommandResult::rendered(output),
        Err(error) => CommandResult::failure(
            "invoke",
            "serialization",
            format!("response envelope could not be encoded: {error}"),
            EXIT_RUNTIME,
        ),
    }
}

pub fn read_request(event_path: &Path) -> Result<AgentRequest, CommandResult> {
    let raw = fs::read_to_string(event_path).map_err(|error| {
        CommandResult::failure(
            "invoke",
            "event_read",
            format!("could not read `{}`: {error}", event_path.display()),
            EXIT_INPUT,
        )
    })?;

    serde_json::from_str(&raw).map_err(|error| {
        CommandResult::failure(
            "invoke",
            "event_decode",
            format!("`{}` is not a request envelope: {error}", event_path.display()),
            EXIT_INPUT,
        )
    })
}
