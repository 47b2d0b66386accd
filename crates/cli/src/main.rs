use std::process::ExitCode;

fn main() -> ExitCode {
    adbridge_cli::run()
}
