use adbridge_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use crate::commands::{escape_json, CommandResult, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const ADAPTER_CHECKS: [&str; 2] = ["command_adapter_settings", "directory_adapter_settings"];

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CONFIG };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_command_settings(&config));
            checks.push(check_directory_settings(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(ADAPTER_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_command_settings(config: &AppConfig) -> DoctorCheck {
    match config.command_settings() {
        Ok(settings) => DoctorCheck {
            name: "command_adapter_settings",
            status: CheckStatus::Pass,
            details: format!(
                "target `{}`, wait budget {}s polled every {}ms",
                settings.management_instance_id,
                settings.wait.budget.as_secs(),
                settings.wait.poll_interval.as_millis()
            ),
        },
        Err(error) => DoctorCheck {
            name: "command_adapter_settings",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_directory_settings(config: &AppConfig) -> DoctorCheck {
    match config.directory_settings() {
        Ok(settings) => DoctorCheck {
            name: "directory_adapter_settings",
            status: CheckStatus::Pass,
            details: format!("directory `{}`", settings.directory_id),
        },
        Err(error) => DoctorCheck {
            name: "directory_adapter_settings",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
