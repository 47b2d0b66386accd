pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use adbridge_core::config::ConfigOverrides;
use clap::{Parser, Subcommand};

use commands::invoke::AdapterKind;
use commands::load_options;

#[derive(Debug, Parser)]
#[command(
    name = "adbridge",
    about = "adbridge operator CLI",
    long_about = "Inspect adapter configuration, check readiness, and replay function-call events.",
    after_help = "Examples:\n  adbridge doctor --json\n  adbridge config\n  adbridge invoke --adapter directory --event event.json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load; it must exist when given")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and per-adapter settings")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Replay a request envelope through an adapter and print the response")]
    Invoke {
        #[arg(long, value_enum, help = "Adapter that answers the event")]
        adapter: AdapterKind,
        #[arg(long, help = "Path to a request envelope JSON file")]
        event: PathBuf,
        #[arg(long, help = "Management instance that runs command documents")]
        instance_id: Option<String>,
        #[arg(long, help = "Directory queried by the directory adapter")]
        directory_id: Option<String>,
        #[arg(long, help = "Seconds to wait for a command to finish")]
        wait_budget_secs: Option<u64>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config;

    let result = match cli.command {
        Command::Config => {
            commands::config::run(load_options(config_path, ConfigOverrides::default()))
        }
        Command::Doctor { json } => {
            commands::doctor::run(load_options(config_path, ConfigOverrides::default()), json)
        }
        Command::Invoke { adapter, event, instance_id, directory_id, wait_budget_secs } => {
            let overrides = ConfigOverrides {
                management_instance_id: instance_id,
                wait_budget_secs,
                directory_id,
            };
            commands::invoke::run(load_options(config_path, overrides), adapter, &event)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
