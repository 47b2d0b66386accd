use std::env;
use std::fs;
use std::path::Path;

use adbridge_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_path = options.config_path.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    CommandResult::rendered(render(&config, config_path.as_deref()))
}

pub fn render(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "command.management_instance_id",
            value: or_unset(config.command.management_instance_id.as_deref()),
            env_keys: &["ADBRIDGE_COMMAND_MANAGEMENT_INSTANCE_ID", "AD_MANAGEMENT_INSTANCE_ID"],
        },
        Field {
            key: "command.wait_budget_secs",
            value: config.command.wait_budget_secs.to_string(),
            env_keys: &["ADBRIDGE_COMMAND_WAIT_BUDGET_SECS"],
        },
        Field {
            key: "command.poll_interval_millis",
            value: config.command.poll_interval_millis.to_string(),
            env_keys: &["ADBRIDGE_COMMAND_POLL_INTERVAL_MILLIS"],
        },
        Field {
            key: "directory.directory_id",
            value: or_unset(config.directory.directory_id.as_deref()),
            env_keys: &["ADBRIDGE_DIRECTORY_ID", "DIRECTORY_ID"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["ADBRIDGE_LOGGING_LEVEL", "ADBRIDGE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["ADBRIDGE_LOGGING_FORMAT", "ADBRIDGE_LOG_FORMAT"],
        },
    ]
}

fn or_unset(value: Option<&str>) -> String {
    value.unwrap_or("<unset>").to_string()
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn dotted_paths_resolve_through_tables() {
        let doc: toml::Value =
            "[command]\nwait_budget_secs = 20\n".parse().expect("fixture should parse");

        assert!(contains_path(&doc, "command.wait_budget_secs"));
        assert!(!contains_path(&doc, "command.management_instance_id"));
        assert!(!contains_path(&doc, "directory.directory_id"));
    }
}
