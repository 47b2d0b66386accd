pub mod config;
pub mod doctor;
pub mod invoke;

use std::path::PathBuf;

use adbridge_core::config::{ConfigOverrides, LoadOptions};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

/// An explicit config path must exist; without one the default candidates are optional.
pub fn load_options(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> LoadOptions {
    LoadOptions { require_file: config_path.is_some(), config_path, overrides }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    /// Successful command whose output is already rendered.
    pub fn rendered(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

pub(crate) fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
