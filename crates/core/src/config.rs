use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::invocation::WaitPolicy;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["adbridge.toml", "config/adbridge.toml"];

const MAX_WAIT_BUDGET_SECS: u64 = 900;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub command: CommandConfig,
    pub directory: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CommandConfig {
    pub management_instance_id: Option<String>,
    pub wait_budget_secs: u64,
    pub poll_interval_millis: u64,
}

#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    pub directory_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Everything the command-execution adapter needs, resolved from [`AppConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSettings {
    pub management_instance_id: String,
    pub wait: WaitPolicy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorySettings {
    pub directory_id: String,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub management_instance_id: Option<String>,
    pub wait_budget_secs: Option<u64>,
    pub directory_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            command: CommandConfig {
                management_instance_id: None,
                wait_budget_secs: 10,
                poll_interval_millis: 500,
            },
            directory: DirectoryConfig { directory_id: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options
                .config_path
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.normalize_ids();
        config.validate()?;

        Ok(config)
    }

    /// Settings for the command-execution adapter. Fails when no management
    /// instance is configured.
    pub fn command_settings(&self) -> Result<CommandSettings, ConfigError> {
        let management_instance_id =
            self.command.management_instance_id.clone().ok_or_else(|| {
                ConfigError::Validation(
                    "command.management_instance_id is required (set AD_MANAGEMENT_INSTANCE_ID)"
                        .to_string(),
                )
            })?;

        Ok(CommandSettings {
            management_instance_id,
            wait: WaitPolicy {
                budget: Duration::from_secs(self.command.wait_budget_secs),
                poll_interval: Duration::from_millis(self.command.poll_interval_millis),
            },
        })
    }

    pub fn directory_settings(&self) -> Result<DirectorySettings, ConfigError> {
        let directory_id = self.directory.directory_id.clone().ok_or_else(|| {
            ConfigError::Validation(
                "directory.directory_id is required (set DIRECTORY_ID)".to_string(),
            )
        })?;

        Ok(DirectorySettings { directory_id })
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(command) = patch.command {
            if let Some(management_instance_id) = command.management_instance_id {
                self.command.management_instance_id = Some(management_instance_id);
            }
            if let Some(wait_budget_secs) = command.wait_budget_secs {
                self.command.wait_budget_secs = wait_budget_secs;
            }
            if let Some(poll_interval_millis) = command.poll_interval_millis {
                self.command.poll_interval_millis = poll_interval_millis;
            }
        }

        if let Some(directory) = patch.directory {
            if let Some(directory_id) = directory.directory_id {
                self.directory.directory_id = Some(directory_id);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let instance_id = read_env("ADBRIDGE_COMMAND_MANAGEMENT_INSTANCE_ID")
            .or_else(|| read_env("AD_MANAGEMENT_INSTANCE_ID"));
        if let Some(value) = instance_id {
            self.command.management_instance_id = Some(value);
        }
        if let Some(value) = read_env("ADBRIDGE_COMMAND_WAIT_BUDGET_SECS") {
            self.command.wait_budget_secs = parse_u64("ADBRIDGE_COMMAND_WAIT_BUDGET_SECS", &value)?;
        }
        if let Some(value) = read_env("ADBRIDGE_COMMAND_POLL_INTERVAL_MILLIS") {
            self.command.poll_interval_millis =
                parse_u64("ADBRIDGE_COMMAND_POLL_INTERVAL_MILLIS", &value)?;
        }

        let directory_id =
            read_env("ADBRIDGE_DIRECTORY_ID").or_else(|| read_env("DIRECTORY_ID"));
        if let Some(value) = directory_id {
            self.directory.directory_id = Some(value);
        }

        let log_level =
            read_env("ADBRIDGE_LOGGING_LEVEL").or_else(|| read_env("ADBRIDGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ADBRIDGE_LOGGING_FORMAT").or_else(|| read_env("ADBRIDGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(management_instance_id) = overrides.management_instance_id {
            self.command.management_instance_id = Some(management_instance_id);
        }
        if let Some(wait_budget_secs) = overrides.wait_budget_secs {
            self.command.wait_budget_secs = wait_budget_secs;
        }
        if let Some(directory_id) = overrides.directory_id {
            self.directory.directory_id = Some(directory_id);
        }
    }

    /// Ids are used verbatim as service arguments, so surrounding whitespace from env
    /// or file values is dropped before validation.
    fn normalize_ids(&mut self) {
        for id in [&mut self.command.management_instance_id, &mut self.directory.directory_id] {
            if let Some(value) = id.as_mut() {
                *value = value.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_command(&self.command)?;
        validate_directory(&self.directory)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_command(command: &CommandConfig) -> Result<(), ConfigError> {
    if let Some(instance_id) = &command.management_instance_id {
        if !instance_id.starts_with("i-") && !instance_id.starts_with("mi-") {
            return Err(ConfigError::Validation(format!(
                "command.management_instance_id must be an instance id (`i-...` or `mi-...`), got `{instance_id}`"
            )));
        }
    }

    if command.wait_budget_secs == 0 || command.wait_budget_secs > MAX_WAIT_BUDGET_SECS {
        return Err(ConfigError::Validation(format!(
            "command.wait_budget_secs must be in range 1..={MAX_WAIT_BUDGET_SECS}"
        )));
    }

    if command.poll_interval_millis == 0
        || command.poll_interval_millis >= command.wait_budget_secs.saturating_mul(1000)
    {
        return Err(ConfigError::Validation(
            "command.poll_interval_millis must be greater than zero and shorter than the wait budget"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_directory(directory: &DirectoryConfig) -> Result<(), ConfigError> {
    if let Some(directory_id) = &directory.directory_id {
        if !directory_id.starts_with("d-") {
            return Err(ConfigError::Validation(format!(
                "directory.directory_id must be a directory id (`d-...`), got `{directory_id}`"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    command: Option<CommandPatch>,
    directory: Option<DirectoryPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CommandPatch {
    management_instance_id: Option<String>,
    wait_budget_secs: Option<u64>,
    poll_interval_millis: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryPatch {
    directory_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
